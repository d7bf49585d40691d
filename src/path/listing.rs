//! Process group listings and their normalization to root-first candidates.

use crate::types::ContainerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One process group in an instance's container tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerNode {
    pub id: ContainerId,
    pub name: String,
    #[serde(default, alias = "parent_group_id")]
    pub parent_id: Option<ContainerId>,
}

/// Wire shape of one entry in the all-paths listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessGroupListing {
    pub id: ContainerId,
    pub name: String,
    #[serde(default)]
    pub parent_group_id: Option<ContainerId>,
    /// Ancestry in whatever order the remote produced
    #[serde(default)]
    pub path: Vec<ContainerNode>,
}

/// A selectable container with its root-first name path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePath {
    pub container_id: ContainerId,
    pub segments: Vec<String>,
}

impl CandidatePath {
    pub fn new(container_id: impl Into<ContainerId>, segments: Vec<String>) -> Self {
        Self {
            container_id: container_id.into(),
            segments,
        }
    }

    pub fn display(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl ProcessGroupListing {
    fn own_node(&self) -> ContainerNode {
        ContainerNode {
            id: self.id.clone(),
            name: self.name.clone(),
            parent_id: self.parent_group_id.clone(),
        }
    }

    /// Normalize to a root-first candidate.
    ///
    /// The chain is rebuilt by following parent links from the node itself, so
    /// the order of `path` does not matter. When the entries carry no usable
    /// links, the position of the node itself tells the order: last means
    /// root-first, first means deepest-first. If the node is missing, its
    /// direct parent at the front means deepest-first. The node is appended if
    /// the listing left it out.
    pub fn to_candidate(&self) -> CandidatePath {
        let mut by_id: HashMap<&str, &ContainerNode> = HashMap::new();
        for node in &self.path {
            by_id.insert(node.id.as_str(), node);
        }
        let own = self.own_node();

        let mut chain: Vec<String> = vec![own.name.clone()];
        let mut parent = own.parent_id.clone().or_else(|| {
            by_id
                .get(own.id.as_str())
                .and_then(|n| n.parent_id.clone())
        });
        while let Some(parent_id) = parent {
            if chain.len() > self.path.len() + 1 {
                break;
            }
            match by_id.get(parent_id.as_str()) {
                Some(node) => {
                    chain.push(node.name.clone());
                    parent = node.parent_id.clone();
                }
                None => break,
            }
        }

        let ancestors_in_path = self.path.iter().filter(|n| n.id != self.id).count();
        let segments = if chain.len() - 1 >= ancestors_in_path {
            chain.reverse();
            chain
        } else {
            self.positional_order()
        };

        CandidatePath::new(self.id.clone(), segments)
    }

    fn positional_order(&self) -> Vec<String> {
        let mut names: Vec<String> = self.path.iter().map(|n| n.name.clone()).collect();
        let first_is_self = self.path.first().map(|n| n.id == self.id).unwrap_or(false);
        let last_is_self = self.path.last().map(|n| n.id == self.id).unwrap_or(false);
        if first_is_self && !last_is_self {
            names.reverse();
        } else if !first_is_self && !last_is_self {
            // Without a self entry, the direct parent sits next to the node
            let parent_first = self.path.len() > 1
                && self.parent_group_id.as_deref() == self.path.first().map(|n| n.id.as_str());
            if parent_first {
                names.reverse();
            }
            names.push(self.name.clone());
        }
        names
    }
}
