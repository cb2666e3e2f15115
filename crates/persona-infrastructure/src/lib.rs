pub mod async_dir_persona_repository;
pub mod config_service;
pub mod dto;
pub mod in_memory_persona_repository;
pub mod paths;
pub mod persona_store;
pub mod storage;

pub use crate::async_dir_persona_repository::AsyncDirPersonaRepository;
pub use crate::config_service::ConfigService;
pub use crate::in_memory_persona_repository::InMemoryPersonaRepository;
pub use crate::paths::PersonaPaths;
