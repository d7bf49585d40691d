//! Integration tests against an in-memory scripted deployment client

mod caches;
mod conflict_resolution;
mod end_to_end;
mod orchestrator_batch;
mod path_selection;
