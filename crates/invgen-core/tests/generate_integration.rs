/*
 * generate_integration.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for host generation and inventory building.
 */

//! These tests build a data directory on disk, run generation, and read the
//! results back through the inventory builder.

use std::fs;
use std::path::Path;

use invgen_core::{
    DataLayout, GenerateOptions, InvgenError, InventoryBuilder, ProjectConfig, ValidationPolicy,
    generate_all, load_generated_hosts,
};
use serde_json::json;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A data directory with one host and two metadata types.
fn sample_data() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let root = temp.path();

    write(
        root,
        "hosts/test-host.yaml",
        "metadata:\n  platform: test-platform\n  environment: test-env\n\nansible_host: 192.168.1.100\n",
    );
    write(root, "metadata/platform/test-platform.yaml", "cpu_arch: x86_64\nmemory: 8GB\n");
    write(root, "metadata/environment/test-env.yaml", "backup_enabled: true\n");
    temp
}

#[test]
fn generates_merged_host_file() {
    let temp = sample_data();
    let layout = DataLayout::new(temp.path());

    let report = generate_all(&layout, &GenerateOptions::default()).unwrap();
    assert_eq!(report.host_count(), 1);

    let content = fs::read_to_string(layout.generated_host_path("test-host")).unwrap();
    assert_eq!(
        content,
        "# platform/test-platform
cpu_arch: x86_64
memory: 8GB

# environment/test-env
backup_enabled: true

# hosts/test-host
metadata:
  platform: test-platform
  environment: test-env
ansible_host: 192.168.1.100
"
    );
}

#[test]
fn end_to_end_example() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "hosts/web1.yaml", "metadata:\n  platform: rpi4\nrole: web\n");
    write(root, "metadata/platform/rpi4.yaml", "cpu_arch: arm64\n");

    let layout = DataLayout::new(root);
    generate_all(&layout, &GenerateOptions::default()).unwrap();

    let content = fs::read_to_string(layout.generated_host_path("web1")).unwrap();
    assert_eq!(
        content,
        "# platform/rpi4\ncpu_arch: arm64\n\n# hosts/web1\nmetadata:\n  platform: rpi4\nrole: web\n"
    );

    let inventory = InventoryBuilder::new(load_generated_hosts(&layout).unwrap()).build();
    assert_eq!(inventory.groups["platform_rpi4"].hosts, vec!["web1".to_string()]);
    assert_eq!(inventory.all.hosts, vec!["web1".to_string()]);
    assert_eq!(inventory.meta.hostvars["web1"]["cpu_arch"], "arm64");
    assert_eq!(inventory.meta.hostvars["web1"]["role"], "web");
}

#[test]
fn generation_is_idempotent() {
    let temp = sample_data();
    write(temp.path(), "hosts/dc1/other.yaml", "metadata:\n  platform: [test-platform]\nzone: é\n");
    let layout = DataLayout::new(temp.path());

    let first = generate_all(&layout, &GenerateOptions::default()).unwrap();
    let before = fs::read(layout.generated_host_path("other")).unwrap();
    let second = generate_all(&layout, &GenerateOptions::default()).unwrap();
    let after = fs::read(layout.generated_host_path("other")).unwrap();

    assert_eq!(before, after);
    assert_eq!(first.written.len(), 2);
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 2);
}

#[test]
fn unknown_metadata_type_aborts_the_run() {
    let temp = sample_data();
    write(temp.path(), "hosts/zz-bad.yaml", "metadata:\n  bogus_type: x\n");
    let layout = DataLayout::new(temp.path());

    let err = generate_all(&layout, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, InvgenError::MetadataTypeNotFound { .. }));
    assert!(!layout.generated_host_path("zz-bad").exists());
}

#[test]
fn unknown_fragment_name_is_not_fatal() {
    let temp = sample_data();
    write(temp.path(), "hosts/web2.yaml", "metadata:\n  platform: doesnotexist\nrole: web\n");
    let layout = DataLayout::new(temp.path());

    generate_all(&layout, &GenerateOptions::default()).unwrap();
    assert_eq!(
        fs::read_to_string(layout.generated_host_path("web2")).unwrap(),
        "# hosts/web2\nmetadata:\n  platform: doesnotexist\nrole: web\n"
    );
}

#[test]
fn duplicate_host_stems_fail_before_writing() {
    let temp = sample_data();
    write(temp.path(), "hosts/a/web1.yaml", "role: a\n");
    write(temp.path(), "hosts/b/web1.yaml", "role: b\n");
    let layout = DataLayout::new(temp.path());

    let err = generate_all(&layout, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, InvgenError::DuplicateHostName { ref name, .. } if name == "web1"));
    assert!(!layout.generated_dir().exists());
}

#[test]
fn continue_on_error_reports_every_failure() {
    let temp = sample_data();
    write(temp.path(), "hosts/bad1.yaml", "metadata:\n  platform: 42\n");
    write(temp.path(), "hosts/bad2.yaml", "metadata:\n  nowhere: x\n");
    let layout = DataLayout::new(temp.path());

    let options = GenerateOptions {
        continue_on_error: true,
        ..GenerateOptions::default()
    };
    match generate_all(&layout, &options) {
        Err(InvgenError::GenerationFailed { failures }) => {
            let hosts: Vec<&str> = failures.iter().map(|f| f.host.as_str()).collect();
            assert_eq!(hosts, vec!["bad1", "bad2"]);
            assert!(matches!(
                failures[0].error,
                InvgenError::InvalidMetadataSelector { .. }
            ));
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }

    // the healthy host was still written
    assert!(layout.generated_host_path("test-host").exists());
}

#[test]
fn strict_validation_from_config_file() {
    let temp = sample_data();
    write(temp.path(), "invgen.yml", "strict: true\nrequired-metadata: [platform, tags]\n");
    let layout = DataLayout::new(temp.path());

    let config = ProjectConfig::discover(&layout).unwrap();
    let err = generate_all(&layout, &GenerateOptions::from(&config)).unwrap_err();
    match err {
        InvgenError::MissingRequiredMetadata {
            host,
            metadata_type,
        } => {
            assert_eq!(host, "test-host");
            assert_eq!(metadata_type, "tags");
        }
        other => panic!("expected MissingRequiredMetadata, got {other:?}"),
    }
}

#[test]
fn strict_default_requires_seven_types() {
    let temp = sample_data();
    let layout = DataLayout::new(temp.path());
    let options = GenerateOptions {
        policy: ValidationPolicy::strict_default(),
        ..GenerateOptions::default()
    };

    let err = generate_all(&layout, &options).unwrap_err();
    assert!(matches!(err, InvgenError::MissingRequiredMetadata { .. }));
}

#[test]
fn clean_removes_stale_output() {
    let temp = sample_data();
    let layout = DataLayout::new(temp.path());
    write(temp.path(), "generated/retired.yaml", "old: true\n");

    let options = GenerateOptions {
        clean: true,
        ..GenerateOptions::default()
    };
    generate_all(&layout, &options).unwrap();

    assert!(!layout.generated_host_path("retired").exists());
    assert!(layout.generated_host_path("test-host").exists());
}

#[test]
fn vault_values_survive_generation() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "hosts/db1.yaml",
        "metadata:\n  tags: [db]\ndb_password: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  336366\n",
    );
    write(temp.path(), "metadata/tags/db.yaml", "port: 5432\n");
    let layout = DataLayout::new(temp.path());

    generate_all(&layout, &GenerateOptions::default()).unwrap();
    let content = fs::read_to_string(layout.generated_host_path("db1")).unwrap();
    assert!(content.contains("db_password: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  336366\n"));

    let builder = InventoryBuilder::new(load_generated_hosts(&layout).unwrap());
    assert_eq!(
        builder.build_host("db1")["db_password"],
        json!({"__ansible_vault": "$ANSIBLE_VAULT;1.1;AES256\n336366\n"})
    );
    assert_eq!(builder.build_host("db1")["port"], 5432);
}

#[test]
fn inventory_groups_from_generated_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "metadata/tags/web.yaml", "http: true\n");
    write(root, "metadata/tags/db.yaml", "sql: true\n");
    write(root, "hosts/h1.yaml", "metadata:\n  tags: [web, db]\n");
    write(root, "hosts/h2.yaml", "metadata:\n  tags: [web]\n");
    let layout = DataLayout::new(root);

    generate_all(&layout, &GenerateOptions::default()).unwrap();
    let builder = InventoryBuilder::new(load_generated_hosts(&layout).unwrap());
    let parsed: serde_json::Value = serde_json::from_str(&builder.render(false).unwrap()).unwrap();

    assert_eq!(parsed["tags_web"], json!({"hosts": ["h1", "h2"]}));
    assert_eq!(parsed["tags_db"], json!({"hosts": ["h1"]}));
    assert_eq!(parsed["all"], json!({"hosts": ["h1", "h2"]}));
    assert_eq!(parsed["_meta"]["hostvars"]["h1"]["sql"], true);
}
