use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use serde_json::{Value, json};

struct Fixture {
    _tmp: tempfile::TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        let json_dir = root.join("json");
        let archive = root.join("shaders_071121");
        std::fs::create_dir_all(&json_dir)?;
        std::fs::create_dir_all(archive.join("search_results"))?;

        write_doc(
            &json_dir,
            "XsBSRd",
            json!({
                "info": {
                    "id": "XsBSRd",
                    "name": "Glow Sphere",
                    "username": "jon",
                    "description": "A sphere that glows",
                    "tags": []
                },
                "renderpass": [{
                    "type": "image",
                    "inputs": [{"type": "sound", "filepath": "/media/a/beat.mp3"}]
                }]
            }),
        )?;
        write_doc(
            &json_dir,
            "Ms2SD1",
            json!({
                "info": {
                    "id": "Ms2SD1",
                    "name": "Flat Color",
                    "username": "ann",
                    "description": "",
                    "tags": ["2d"]
                },
                "renderpass": [{"type": "image", "inputs": []}]
            }),
        )?;
        std::fs::write(archive.join("search_results/procedural"), "XsBSRd\n")?;

        Ok(Self { _tmp: tmp, root })
    }

    fn run(&self, args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
        let output = Command::new(shaderdex_bin()?)
            .arg("--data-dir")
            .arg(self.root.join("data"))
            .arg("--json-dir")
            .arg(self.root.join("json"))
            .arg("--archive")
            .arg(self.root.join("shaders_071121"))
            .args(args)
            .env_remove("SHADERDEX_LOG")
            .output()?;
        Ok(output)
    }

    fn stdout(&self, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
        let output = self.run(args)?;
        assert!(
            output.status.success(),
            "shaderdex {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(String::from_utf8(output.stdout)?)
    }
}

fn write_doc(
    dir: &Path,
    id: &str,
    doc: Value,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(dir.join(format!("{id}.json")), doc.to_string())?;
    Ok(())
}

#[test]
fn search_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let fx = Fixture::new()?;

    let out = fx.stdout(&["-q", "search", "--name", "glow"])?;
    assert!(out.contains("Found 1 matching shaders:"));
    assert!(out.contains("ID: XsBSRd"));
    assert!(out.contains("Tags: None"));
    assert!(!out.contains("Ms2SD1"));

    let out = fx.stdout(&["-q", "search", "--name", "nothing-like-this"])?;
    assert!(out.contains("No shaders found matching the criteria."));
    Ok(())
}

#[test]
fn search_json_by_mapped_tag() -> Result<(), Box<dyn std::error::Error>> {
    let fx = Fixture::new()?;

    let out = fx.stdout(&["-q", "search", "--tags", "proc", "--json"])?;
    let results: Value = serde_json::from_str(&out)?;
    let results = results.as_array().expect("json array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "XsBSRd");
    Ok(())
}

#[test]
fn search_without_criteria_prints_help() -> Result<(), Box<dyn std::error::Error>>
{
    let fx = Fixture::new()?;

    let output = fx.run(&["-q", "search"])?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("--requires"));
    Ok(())
}

#[test]
fn apply_then_search_by_capability() -> Result<(), Box<dyn std::error::Error>>
{
    let fx = Fixture::new()?;

    let out = fx.stdout(&["-q", "search", "--requires", "sound"])?;
    assert!(out.contains("No shaders found"));

    let out = fx.stdout(&["-q", "apply"])?;
    assert!(out.contains("Updated 1 JSON files with tag information"));
    assert!(out.contains("Updated 2 JSON files with requires information"));

    let out = fx.stdout(&["-q", "apply"])?;
    assert!(out.contains("Updated 0 JSON files with tag information"));
    assert!(out.contains("Updated 0 JSON files with requires information"));

    let out = fx.stdout(&["-q", "search", "--author", "jon", "--requires", "sound"])?;
    assert!(out.contains("ID: XsBSRd"));

    let doc: Value = serde_json::from_str(&fx.stdout(&["-q", "show", "XsBSRd", "--json"])?)?;
    assert_eq!(doc["info"]["tags"], json!(["procedural"]));
    Ok(())
}

#[test]
fn reindex_and_status() -> Result<(), Box<dyn std::error::Error>> {
    let fx = Fixture::new()?;

    let out = fx.stdout(&["-q", "reindex"])?;
    assert!(out.contains("Indexed 2 shaders and 1 tags"));

    let status: Value = serde_json::from_str(&fx.stdout(&["-q", "status", "--json"])?)?;
    assert_eq!(status["index_slot"], true);
    assert_eq!(status["indexed_shaders"], 2);
    assert_eq!(status["corpus_documents"], 2);

    let out = fx.stdout(&["-q", "list"])?;
    let ids: Vec<&str> = out
        .lines()
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(ids, vec!["Ms2SD1", "XsBSRd"]);
    Ok(())
}

#[test]
fn show_unknown_shader_fails() -> Result<(), Box<dyn std::error::Error>> {
    let fx = Fixture::new()?;

    let output = fx.run(&["-q", "show", "nope"])?;
    assert!(!output.status.success());
    Ok(())
}

fn shaderdex_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(bin) = std::env::var("CARGO_BIN_EXE_shaderdex") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("shaderdex");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}
