use std::fs;

use mediarag_core::chunk::ChunkingConfig;
use mediarag_core::config::{resolve_with_base, Config};
use mediarag_core::{Backend, Error};
use tempfile::TempDir;

#[test]
fn env_specific_file_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("config.toml"), "[chunking]\nmax_tokens = 200\noverlap_percent = 0.1\n").unwrap();
    fs::write(dir.join("config.test.toml"), "[chunking]\nmax_tokens = 50\n").unwrap();

    let config = Config::from_dir(dir, "test").expect("load");
    let chunking: ChunkingConfig = config.get("chunking").expect("chunking");
    assert_eq!(chunking.max_tokens, 50, "test env file wins");
    assert!((chunking.overlap_percent - 0.1).abs() < 1e-6, "base value survives the merge");

    let prod = Config::from_dir(dir, "prod").expect("load prod");
    let chunking: ChunkingConfig = prod.get("chunking").expect("chunking");
    assert_eq!(chunking.max_tokens, 200, "no prod file, base value used");
}

#[test]
fn missing_section_falls_back_to_default() {
    let tmp = TempDir::new().unwrap();
    let config = Config::from_dir(tmp.path(), "dev").expect("load without files");
    let chunking: ChunkingConfig = config.section_or_default("chunking").expect("default");
    assert_eq!(chunking.max_tokens, ChunkingConfig::default().max_tokens);
    assert!(!config.contains("chunking"));
}

#[test]
fn malformed_section_is_invalid_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[chunking]\nmax_tokens = \"lots\"\n").unwrap();
    let config = Config::from_dir(tmp.path(), "dev").expect("load");
    let err = config.section_or_default::<ChunkingConfig>("chunking");
    assert!(matches!(err, Err(Error::InvalidConfig(_))));
}

#[test]
fn empty_generation_table_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[generation]\n").unwrap();
    assert!(matches!(Config::from_dir(tmp.path(), "dev"), Err(Error::InvalidConfig(_))));
}

#[test]
fn backend_choice_reads_from_config() {
    let config = Config::from_serialized(&serde_json::json!({ "default_backend": "vLLM" }));
    let backend: Backend = config.get("default_backend").expect("backend");
    assert_eq!(backend, Backend::Vllm);

    let bad = Config::from_serialized(&serde_json::json!({ "default_backend": "Bard" }));
    assert!(bad.get::<Backend>("default_backend").is_err());
}

#[test]
fn relative_paths_resolve_against_base() {
    let tmp = TempDir::new().unwrap();
    let resolved = resolve_with_base(tmp.path(), "indexes/tantivy");
    assert_eq!(resolved, tmp.path().join("indexes/tantivy"));
    let absolute = resolve_with_base(tmp.path(), "/var/lib/mediarag");
    assert!(absolute.is_absolute());
    assert!(!absolute.starts_with(tmp.path()));
}
