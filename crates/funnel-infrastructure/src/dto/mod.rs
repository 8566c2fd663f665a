//! Data Transfer Objects for on-disk formats.
//!
//! DTOs mirror the file layout and convert to and from the domain types in
//! `funnel-core`. Domain types never see file-format concerns.

mod registry;

pub use registry::{AnalysisDto, CounterDto, PromptDto, REGISTRY_FORMAT_VERSION, RegistryFileV1, StepDto};
