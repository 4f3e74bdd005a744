//! Integration tests for the `bk` CLI.
//!
//! Each test points `bk` at a temp data directory, runs it as a subprocess,
//! and checks stdout and/or the JSON records it leaves behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `bk` binary.
fn bk_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // test binary name
    path.pop(); // deps/
    path.push("bk");
    path
}

/// Run `bk -C <dir>` with the given args, returning (stdout, stderr, success).
fn run_bk(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(bk_bin())
        .arg("-C")
        .arg(dir)
        .args(args)
        .env_remove("BASKET_LOG")
        .output()
        .expect("failed to run bk");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `bk` expecting success, return stdout.
fn run_bk_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_bk(dir, args);
    if !success {
        panic!("bk {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

/// Run `bk` expecting failure, return stderr.
fn run_bk_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_bk(dir, args);
    if success {
        panic!("bk {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

fn json(out: &str) -> serde_json::Value {
    serde_json::from_str(out).unwrap()
}

fn read_record(dir: &Path, key: &str) -> serde_json::Value {
    let text = fs::read_to_string(dir.join(format!("{}.json", key))).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Add an item and return its id
fn add(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    run_bk_ok(dir, &full).trim().to_string()
}

// ---------------------------------------------------------------------------
// First run
// ---------------------------------------------------------------------------

#[test]
fn test_first_run_creates_default_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_bk_ok(tmp.path(), &["lists", "--json"]);
    let lists = json(&out);
    let lists = lists.as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["name"], "Shopping List");
    assert_eq!(lists[0]["current"], true);

    let saved = read_record(tmp.path(), "shopping_lists");
    assert_eq!(saved.as_array().unwrap().len(), 1);
    assert_eq!(read_record(tmp.path(), "current_list_id"), lists[0]["id"]);
}

#[test]
fn test_legacy_data_is_migrated() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("shopping_list.json"),
        r#"[
  {"id": 1, "name": "Rice", "quantity": 2, "purchased": false},
  {"id": 2, "name": "Beans", "quantity": 1, "purchased": true, "category": "Pantry"}
]"#,
    )
    .unwrap();
    fs::write(tmp.path().join("shopping_list_name.json"), r#""Old list""#).unwrap();

    let out = run_bk_ok(tmp.path(), &["show", "--json"]);
    let shown = json(&out);
    assert_eq!(shown["name"], "Old list");
    assert_eq!(shown["totals"]["total"], 2);
    assert_eq!(shown["totals"]["purchased"], 1);

    let groups = shown["groups"].as_array().unwrap();
    assert_eq!(groups[0]["category"], "General");
    assert_eq!(groups[0]["items"][0]["name"], "Rice");
    assert_eq!(groups[1]["category"], "Pantry");

    let saved = read_record(tmp.path(), "shopping_lists");
    assert_eq!(saved[0]["name"], "Old list");
    assert_eq!(saved[0]["items"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_show_grouped() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), &["Milk", "-q", "2", "-c", "Dairy"]);
    add(tmp.path(), &["Apples", "-c", "Produce"]);
    add(tmp.path(), &["Bread"]);

    let out = run_bk_ok(tmp.path(), &["show"]);
    assert!(out.starts_with("Shopping List  (0/3 purchased)"));
    let dairy = out.find("Dairy").unwrap();
    let general = out.find("General").unwrap();
    let produce = out.find("Produce").unwrap();
    assert!(dairy < general && general < produce);
    assert!(out.contains("Milk"));
}

#[test]
fn test_no_subcommand_shows_current_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), &["Coffee"]);
    let out = run_bk_ok(tmp.path(), &[]);
    assert!(out.contains("Coffee"));
}

#[test]
fn test_add_rejects_blank_name_and_zero_quantity() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bk_err(tmp.path(), &["add", "   "]);
    assert!(err.contains("item name is empty"));
    run_bk_err(tmp.path(), &["add", "Eggs", "-q", "0"]);
}

#[test]
fn test_check_toggles_purchased() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), &["Milk"]);

    let out = run_bk_ok(tmp.path(), &["check", &id, "--json"]);
    assert_eq!(json(&out)["purchased"], true);
    let out = run_bk_ok(tmp.path(), &["check", &id, "--json"]);
    assert_eq!(json(&out)["purchased"], false);
}

#[test]
fn test_edit_changes_only_given_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), &["Milk", "-q", "2", "-c", "Dairy"]);

    let out = run_bk_ok(tmp.path(), &["edit", &id, "--qty", "5", "--json"]);
    let item = json(&out);
    assert_eq!(item["quantity"], 5);
    assert_eq!(item["name"], "Milk");
    assert_eq!(item["category"], "Dairy");

    let err = run_bk_err(tmp.path(), &["edit", &id]);
    assert!(err.contains("nothing to change"));
}

#[test]
fn test_rm_and_unknown_ids() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add(tmp.path(), &["Milk"]);
    run_bk_ok(tmp.path(), &["rm", &id]);

    let out = run_bk_ok(tmp.path(), &["show", "--json"]);
    assert_eq!(json(&out)["totals"]["total"], 0);

    let err = run_bk_err(tmp.path(), &["rm", &id]);
    assert!(err.contains("not found"));
    let err = run_bk_err(tmp.path(), &["check", "12345"]);
    assert!(err.contains("item 12345 not found"));
}

#[test]
fn test_clear_empties_current_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), &["Milk"]);
    add(tmp.path(), &["Eggs"]);
    let out = run_bk_ok(tmp.path(), &["clear"]);
    assert!(out.contains("removed 2 item(s)"));
    let out = run_bk_ok(tmp.path(), &["show", "--json"]);
    assert_eq!(json(&out)["totals"]["total"], 0);
}

#[test]
fn test_show_filters() {
    let tmp = tempfile::TempDir::new().unwrap();
    let milk = add(tmp.path(), &["Milk", "-c", "Dairy"]);
    add(tmp.path(), &["Cheese", "-c", "Dairy"]);
    add(tmp.path(), &["Apples", "-c", "Produce"]);
    run_bk_ok(tmp.path(), &["check", &milk]);

    let out = run_bk_ok(tmp.path(), &["show", "--pending", "--flat", "--json"]);
    let names: Vec<String> = json(&out)["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Cheese", "Apples"]);

    let out = run_bk_ok(tmp.path(), &["show", "-c", "Dairy", "-s", "MIL", "--flat", "--json"]);
    let shown = json(&out);
    assert_eq!(shown["items"].as_array().unwrap().len(), 1);
    assert_eq!(shown["totals"]["total"], 3);
}

#[test]
fn test_hide_purchased_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let milk = add(tmp.path(), &["Milk"]);
    add(tmp.path(), &["Eggs"]);
    run_bk_ok(tmp.path(), &["check", &milk]);
    fs::write(tmp.path().join("config.toml"), "[display]\nhide_purchased = true\n").unwrap();

    let out = run_bk_ok(tmp.path(), &["show"]);
    assert!(!out.contains("Milk"));
    assert!(out.contains("Eggs"));

    let out = run_bk_ok(tmp.path(), &["show", "--all"]);
    assert!(out.contains("Milk"));
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn test_new_use_and_drop_lists() {
    let tmp = tempfile::TempDir::new().unwrap();
    add(tmp.path(), &["Milk"]);
    let out = run_bk_ok(tmp.path(), &["new", "Party", "--json"]);
    let party_id = json(&out)["id"].as_i64().unwrap().to_string();

    // New list is selected and empty
    let out = run_bk_ok(tmp.path(), &["show", "--json"]);
    assert_eq!(json(&out)["name"], "Party");
    assert_eq!(json(&out)["totals"]["total"], 0);

    // Switch back by name
    let out = run_bk_ok(tmp.path(), &["use", "shopping list"]);
    assert_eq!(out.trim(), "Shopping List");
    let out = run_bk_ok(tmp.path(), &["show"]);
    assert!(out.contains("Milk"));

    // Drop the selected list: selection falls back to the first list
    run_bk_ok(tmp.path(), &["use", &party_id]);
    let out = run_bk_ok(tmp.path(), &["drop", &party_id]);
    assert!(out.contains("now on Shopping List"));

    // The last list stays
    let err = run_bk_err(tmp.path(), &["drop", "Shopping List"]);
    assert!(err.contains("last list"));
    let out = run_bk_ok(tmp.path(), &["lists", "--json"]);
    assert_eq!(json(&out).as_array().unwrap().len(), 1);
}

#[test]
fn test_use_unknown_list_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bk_err(tmp.path(), &["use", "9999"]);
    assert!(err.contains("list not found"));
}

#[test]
fn test_rename_blank_resets_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_bk_ok(tmp.path(), &["rename", "Weekly"]);
    assert_eq!(out.trim(), "Weekly");
    let out = run_bk_ok(tmp.path(), &["rename", "   "]);
    assert_eq!(out.trim(), "Shopping List");
}

#[test]
fn test_new_without_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_bk_ok(tmp.path(), &["new"]);
    assert!(out.contains("New list"));
}

#[test]
fn test_lists_marks_current() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_bk_ok(tmp.path(), &["new", "Party"]);
    let out = run_bk_ok(tmp.path(), &["lists"]);
    let party = out.lines().find(|l| l.contains("Party")).unwrap();
    assert!(party.starts_with('*'));
    let default = out.lines().find(|l| l.contains("Shopping List")).unwrap();
    assert!(default.starts_with(' '));
}

// ---------------------------------------------------------------------------
// Share and categories
// ---------------------------------------------------------------------------

#[test]
fn test_share_text() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_bk_ok(tmp.path(), &["rename", "Weekly"]);
    let milk = add(tmp.path(), &["Milk", "-q", "2", "-c", "Dairy"]);
    add(tmp.path(), &["Bread", "-c", "Bakery"]);
    run_bk_ok(tmp.path(), &["check", &milk]);

    let out = run_bk_ok(tmp.path(), &["share"]);
    assert_eq!(
        out,
        "# Weekly\n\n## Bakery\n- [ ] Bread\n\n## Dairy\n- [x] Milk x2\n"
    );
}

#[test]
fn test_categories_add_and_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_bk_ok(tmp.path(), &["categories"]);
    assert!(out.contains("General (default)"));
    assert!(!out.contains("Pets"));

    run_bk_ok(tmp.path(), &["categories", "add", "  Pets "]);
    let out = run_bk_ok(tmp.path(), &["categories", "--json"]);
    let cats: Vec<String> = serde_json::from_str(&out).unwrap();
    assert!(cats.contains(&"Pets".to_string()));

    let out = run_bk_ok(tmp.path(), &["categories", "add", "Bakery"]);
    assert!(out.contains("already exists"));
    let config = fs::read_to_string(tmp.path().join("config.toml")).unwrap();
    assert!(!config.contains("Bakery"));
}

#[test]
fn test_default_category_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[categories]\ndefault = \"Produce\"\n").unwrap();
    add(tmp.path(), &["Pears"]);
    let out = run_bk_ok(tmp.path(), &["show", "--flat", "--json"]);
    assert_eq!(json(&out)["items"][0]["category"], "Produce");
}

// ---------------------------------------------------------------------------
// Robustness
// ---------------------------------------------------------------------------

#[test]
fn test_malformed_lists_record_is_backed_up() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("shopping_lists.json"), "not json {{{").unwrap();

    let out = run_bk_ok(tmp.path(), &["lists", "--json"]);
    assert_eq!(json(&out).as_array().unwrap().len(), 1);
    assert!(tmp.path().join("shopping_lists.json.bak").exists());
}

#[test]
fn test_add_reads_config_under_lock() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_bk_ok(tmp.path(), &["lists"]);

    let lock = basket::io::lock::DataLock::acquire_default(tmp.path()).unwrap();
    let child = Command::new(bk_bin())
        .arg("-C")
        .arg(tmp.path())
        .args(["add", "Pears"])
        .env_remove("BASKET_LOG")
        .stdout(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(300));
    fs::write(tmp.path().join("config.toml"), "[categories]\ndefault = \"Produce\"\n").unwrap();
    drop(lock);
    assert!(child.wait_with_output().unwrap().status.success());

    let out = run_bk_ok(tmp.path(), &["show", "--flat", "--json"]);
    assert_eq!(json(&out)["items"][0]["category"], "Produce");
}

#[test]
fn test_wrongly_shaped_lists_are_kept() {
    let tmp = tempfile::TempDir::new().unwrap();
    let saved = r#"[{"id": 1, "name": "Weekly", "items": [{"id": "x", "name": "Milk"}]}]"#;
    fs::write(tmp.path().join("shopping_lists.json"), saved).unwrap();

    let out = run_bk_ok(tmp.path(), &["lists", "--json"]);
    assert_eq!(json(&out)[0]["name"], "Shopping List");
    let kept = fs::read_to_string(tmp.path().join("shopping_lists.json.bak")).unwrap();
    assert_eq!(kept, saved);
}

#[test]
fn test_lock_file_is_removed_after_command() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_bk_ok(tmp.path(), &["lists"]);
    assert!(!tmp.path().join(".lock").exists());
}
