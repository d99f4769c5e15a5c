use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const TOP: &str = "dowprov/dowprov.svx";

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Command running inside `dir`, unaffected by a keyword list in the environment
fn svx_keywords(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("svx-keywords"));
    cmd.current_dir(dir).env_remove("SVX_KEYWORDS").env_remove("RUST_LOG");
    cmd
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn keywords_lists_included_files_in_place() {
    let assert = svx_keywords(&fixtures())
        .args(["keywords", "dowprov/dowprov"])
        .assert()
        .success();

    assert_eq!(
        stdout_lines(assert.get_output()),
        vec![
            "dowprov/dowprov.svx:2:*begin dowprov",
            "dowprov/dowprov.svx:3:*cs OSGB:SD",
            "dowprov/dowprov.svx:4:*include dow\\dowcave",
            "dowprov/dow/dowcave.svx:1:*begin DowCave",
            "dowprov/dow/dowcave.svx:2:*entrance 1",
            "dowprov/dow/dowcave.svx:3:*fix 1 98378 74300 334 ; entrance",
            "dowprov/dow/dowcave.svx:5:*end DowCave",
            "dowprov/dowprov.svx:5:*include \"prov/providence\"",
            "dowprov/prov/providence.svx:1:*begin providence",
            "dowprov/prov/providence.svx:2:*Fix 1 98590 74720 380",
            "dowprov/prov/providence.svx:4:*End providence",
            "dowprov/dowprov.svx:6:*equate dowcave.1 providence.9",
            "dowprov/dowprov.svx:7:*end dowprov",
        ]
    );
}

#[test]
fn keywords_with_paths_shows_lowercased_survey_path() {
    svx_keywords(&fixtures())
        .args(["keywords", TOP, "-k", "fix", "--paths"])
        .assert()
        .success()
        .stdout(
            "dowprov/dow/dowcave.svx:3:dowprov.dowcave:*fix 1 98378 74300 334 ; entrance\n\
             dowprov/prov/providence.svx:2:dowprov.providence:*Fix 1 98590 74720 380\n",
        );
}

#[test]
fn keywords_jsonl_carries_full_record() {
    let assert = svx_keywords(&fixtures())
        .args(["--format", "jsonl", "keywords", TOP, "-k", "FIX,entrance"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 3);
    let fix = &items[1];
    assert_eq!(fix["file"], "dowprov/dow/dowcave.svx");
    assert_eq!(fix["encoding"], "UTF-8");
    assert_eq!(fix["line"], 3);
    assert_eq!(fix["context"], serde_json::json!(["dowprov", "dowcave"]));
    assert_eq!(fix["keyword"], "FIX");
    assert_eq!(fix["argument"], "1 98378 74300 334");
    assert_eq!(fix["text"], "*fix 1 98378 74300 334 ; entrance");
}

#[test]
fn keywords_totals_by_count() {
    svx_keywords(&fixtures())
        .args(["keywords", TOP, "-t"])
        .assert()
        .success()
        .stdout(
            "dowprov/dowprov.svx:BEGIN:3\n\
             dowprov/dowprov.svx:END:3\n\
             dowprov/dowprov.svx:FIX:2\n\
             dowprov/dowprov.svx:INCLUDE:2\n\
             dowprov/dowprov.svx:CS:1\n\
             dowprov/dowprov.svx:ENTRANCE:1\n\
             dowprov/dowprov.svx:EQUATE:1\n",
        );
}

#[test]
fn keywords_summary() {
    svx_keywords(&fixtures())
        .args(["keywords", TOP, "-s", "-e", "begin,end"])
        .assert()
        .success()
        .stdout("dowprov/dowprov.svx:CS|ENTRANCE|EQUATE|FIX|INCLUDE: 7 records found\n");
}

#[test]
fn keywords_from_environment() {
    svx_keywords(&fixtures())
        .env("SVX_KEYWORDS", "equate")
        .args(["keywords", TOP])
        .assert()
        .success()
        .stdout("dowprov/dowprov.svx:6:*equate dowcave.1 providence.9\n");
}

#[test]
fn keywords_without_hits_prints_summary_unless_quiet() {
    svx_keywords(&fixtures())
        .args(["keywords", TOP, "-k", "data"])
        .assert()
        .success()
        .stdout("dowprov/dowprov.svx:DATA: 0 records found\n");

    svx_keywords(&fixtures())
        .args(["keywords", TOP, "-k", "data", "-q"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn keywords_export_tsv() {
    let temp = tempdir().unwrap();
    let out = temp.path().join("keywords.tsv");

    svx_keywords(&fixtures())
        .args(["keywords", TOP, "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("13 records found > "));

    let content = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = content.lines().collect();
    assert_eq!(rows.len(), 14);
    assert_eq!(rows[0], "file\tencoding\tline\tpath\tkeyword\targument\tfull");
    assert_eq!(
        rows[10],
        "dowprov/prov/providence.svx\tUTF-8\t2\tdowprov.providence\tFIX\t1 98590 74720 380\t*Fix 1 98590 74720 380"
    );
}

#[test]
fn keywords_export_json_is_quiet_with_q() {
    let temp = tempdir().unwrap();
    let out = temp.path().join("keywords.json");

    svx_keywords(&fixtures())
        .args(["-q", "keywords", TOP, "-k", "cs", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout("");

    let items: Vec<Value> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["label"], "CS");
    assert_eq!(items[0]["argument"], "OSGB:SD");
}

#[test]
fn grep_searches_every_line() {
    svx_keywords(&fixtures())
        .args(["grep", "^9 1", TOP])
        .assert()
        .success()
        .stdout("dowprov/prov/providence.svx:3:9 1 4.25 180 -10\n");
}

#[test]
fn grep_ignore_case() {
    let assert = svx_keywords(&fixtures())
        .args(["grep", "\\*FIX", TOP, "-i"])
        .assert()
        .success();
    assert_eq!(stdout_lines(assert.get_output()).len(), 2);
}

#[test]
fn grep_without_match_exits_one() {
    svx_keywords(&fixtures())
        .args(["grep", "nowhere", TOP])
        .assert()
        .code(1)
        .stdout("");
}

#[test]
fn files_tree_in_reading_order() {
    svx_keywords(&fixtures())
        .args(["files", "dowprov/dowprov", "--tree"])
        .assert()
        .success()
        .stdout(
            "dowprov/dowprov.svx (UTF-8)\n  \
             dowprov/dow/dowcave.svx (UTF-8)\n  \
             dowprov/prov/providence.svx (UTF-8)\n",
        );
}

#[test]
fn keywords_read_latin1_file() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("caf\u{e9}.svx"),
        b"*begin caf\xe9\n*fix 1 0 0 0\n*end caf\xe9\n",
    );
    write_file(&temp.path().join("top.svx"), "*include café\n".as_bytes());
    let assert = svx_keywords(temp.path())
        .args(["--format", "jsonl", "keywords", "top", "-k", "fix"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["encoding"], "ISO-8859-1");
    assert_eq!(items[0]["context"], serde_json::json!(["café"]));
}

#[test]
fn lint_clean_and_dirty_trees() {
    svx_keywords(&fixtures())
        .args(["lint", TOP])
        .assert()
        .success()
        .stdout("dowprov/dowprov.svx: 3 files read, no anomalies\n");

    let temp = tempdir().unwrap();
    write_file(&temp.path().join("top.svx"), b"*begin a\n*end b\n*end\n");
    svx_keywords(temp.path())
        .args(["lint", "top"])
        .assert()
        .code(1)
        .stdout(
            "WARNING: mismatched BEGIN and END statements: END b at line 2 in top.svx closes BEGIN a\n\
             WARNING: empty END statement at line 3 in top.svx\n",
        );
}

#[test]
fn warn_prints_anomalies_on_stderr() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("top.svx"), b"*begin\n*fix 1 0 0 0\n");

    svx_keywords(temp.path())
        .args(["-w", "keywords", "top", "-k", "fix"])
        .assert()
        .success()
        .stdout("top.svx:2:*fix 1 0 0 0\n")
        .stderr(predicate::str::contains("WARNING: empty BEGIN statement at line 1"));
}

#[test]
fn missing_include_fails() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("top.svx"), b"*begin a\n*include gone\n*end a\n");

    svx_keywords(temp.path())
        .args(["keywords", "top"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open gone.svx included from top.svx:2"));
}

#[test]
fn missing_root_fails() {
    let temp = tempdir().unwrap();
    svx_keywords(temp.path())
        .args(["files", "absent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("survey file not found: absent.svx"));
}

#[test]
fn include_cycle_fails() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("a.svx"), b"*include b\n");
    write_file(&temp.path().join("b.svx"), b"*include a\n");

    svx_keywords(temp.path())
        .args(["files", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inclusion cycle: a.svx -> b.svx -> a.svx"));
}

#[test]
fn custom_markers() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("top.svx"),
        b"#begin x\n#fix 1 0 0 0 % note\n*fix 2 0 0 0\n#end x\n",
    );

    svx_keywords(temp.path())
        .args(["--marker", "#", "--comment", "%", "keywords", "top", "-k", "fix", "-p"])
        .assert()
        .success()
        .stdout("top.svx:2:x:#fix 1 0 0 0 % note\n");
}

#[test]
fn verbose_logs_entered_files() {
    svx_keywords(&fixtures())
        .args(["-v", "files", TOP])
        .assert()
        .success()
        .stderr(predicate::str::contains("entering file"));
}
