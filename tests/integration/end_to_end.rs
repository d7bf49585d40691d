//! Preparation feeding the orchestrator, with listings served by the scripted client.

use super::support::{Call, ScriptedClient};
use flowdeploy::cache::PathCache;
use flowdeploy::deploy::{
    BatchProgress, DeployFlags, DeploymentOrchestrator, PreparationContext, TargetPreparer,
    TemplateDescriptor,
};
use flowdeploy::hierarchy::{FlowRecord, Hierarchy};
use flowdeploy::instance::{
    ConfigInstanceRepository, ConnectionInfo, InstanceDescriptor, InstanceRegistry,
};
use flowdeploy::naming::NameTemplate;
use flowdeploy::path::{ContainerNode, PathConfig, PathConfigSet, ProcessGroupListing};
use flowdeploy::types::Side;
use std::collections::HashMap;
use std::sync::Arc;

fn descriptor(id: &str, value: &str) -> InstanceDescriptor {
    InstanceDescriptor {
        id: id.to_string(),
        hierarchy_level_name: "DC".to_string(),
        hierarchy_level_value: value.to_string(),
        connection: ConnectionInfo {
            base_url: format!("https://{}:8443", id),
            verify_tls: true,
        },
    }
}

fn node(id: &str, name: &str, parent: Option<&str>) -> ContainerNode {
    ContainerNode {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: parent.map(str::to_string),
    }
}

fn dc1_listing() -> Vec<ProcessGroupListing> {
    let root = node("root", "NiFi Flow", None);
    let base = node("base", "From DC1", Some("root"));
    let o1 = node("o1", "o1", Some("base"));
    vec![
        ProcessGroupListing {
            id: "o1".to_string(),
            name: "o1".to_string(),
            parent_group_id: Some("base".to_string()),
            path: vec![root.clone(), base.clone()],
        },
        ProcessGroupListing {
            id: "pg-ou1".to_string(),
            name: "ou1".to_string(),
            parent_group_id: Some("o1".to_string()),
            path: vec![root, base, o1],
        },
    ]
}

fn flow(id: &str, o: &str, ou: &str, cn: &str, dst_dc: &str) -> FlowRecord {
    FlowRecord::builder(id)
        .value("DC", "dc1", dst_dc)
        .value("O", o, o)
        .value("OU", ou, ou)
        .value("CN", cn, cn)
        .templates(Some(7), Some(8))
        .build()
}

#[tokio::test]
async fn prepared_targets_deploy_to_resolved_and_new_containers() {
    let hierarchy = Hierarchy::from_names(["DC", "O", "OU", "CN"]).unwrap();
    let mut instances = InstanceRegistry::with_repository(Arc::new(ConfigInstanceRepository::new(
        vec![descriptor("nifi-1", "dc1"), descriptor("nifi-2", "dc2")],
    )));
    instances.ensure_loaded().unwrap();
    let paths = PathConfigSet::new(vec![PathConfig::parse(
        "nifi-1",
        Side::Source,
        "base",
        "/NiFi Flow/From DC1",
    )]);
    let templates = vec![
        TemplateDescriptor {
            id: 7,
            name: "ingest".to_string(),
        },
        TemplateDescriptor {
            id: 8,
            name: "egress".to_string(),
        },
    ];
    let name_template = NameTemplate::new("{first_hierarchy_value}-{last_hierarchy_value}");
    let preparer = TargetPreparer::new(PreparationContext {
        hierarchy: &hierarchy,
        instances: &instances,
        paths: &paths,
        templates: &templates,
        name_template: &name_template,
        parameter_contexts: HashMap::from([(Side::Source, "dc-params".to_string())]),
        version: None,
    });

    let client = Arc::new(ScriptedClient::new().with_listing("nifi-1", dc1_listing()));
    let cache = PathCache::new();
    let flows = vec![
        flow("f1", "o1", "ou1", "cn1", "dc9"),
        flow("f2", "o2", "ou2", "cn2", "dc9"),
    ];
    for instance_id in preparer.required_instances(&flows) {
        cache.get_or_fetch(&instance_id, client.as_ref()).await.unwrap();
    }

    let prepared = preparer.prepare_all(&flows, &cache);
    // source and destination for each flow
    assert_eq!(prepared.len(), 4);

    let f1 = &prepared[0];
    assert!(f1.is_ready());
    assert_eq!(f1.target.resolved_container_id.as_deref(), Some("pg-ou1"));
    assert_eq!(f1.target.generated_name, "dc1-cn1");
    assert_eq!(f1.target.hierarchy_attribute.as_deref(), Some("OU"));
    assert_eq!(f1.target.parameter_context_name.as_deref(), Some("dc-params"));

    let f1_destination = &prepared[1];
    assert!(!f1_destination.is_ready(), "no instance serves dc9");

    let f2 = &prepared[2];
    assert!(f2.is_ready());
    assert_eq!(f2.target.resolved_container_id, None);
    assert_eq!(
        f2.target.parent_path.as_deref(),
        Some(&["NiFi Flow".to_string(), "From DC1".to_string(), "o2".to_string(), "ou2".to_string()][..])
    );
    assert_eq!(f2.target.generated_name, "cn2");

    let mut orchestrator = DeploymentOrchestrator::new(client.clone(), DeployFlags::default());
    let targets = prepared.into_iter().map(|p| p.target).collect();
    let BatchProgress::Completed(result) = orchestrator.run_batch(targets).await.unwrap() else {
        panic!("no conflicts were scripted");
    };
    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.failed(), 2);

    let deploys = client.deploy_calls();
    assert_eq!(
        deploys,
        vec![
            Call::Deploy {
                instance_id: "nifi-1".to_string(),
                name: Some("dc1-cn1".to_string()),
                parent: "pg-ou1".to_string(),
            },
            Call::Deploy {
                instance_id: "nifi-1".to_string(),
                name: Some("cn2".to_string()),
                parent: "/NiFi Flow/From DC1/o2/ou2".to_string(),
            },
        ]
    );
}
