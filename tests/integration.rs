use std::path::Path;
use std::process::{Command, Output};

fn rangelink_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rangelink"));
    cmd.current_dir(dir);
    cmd.env_remove("RANGELINK_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    rangelink_cmd(dir).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(
        dir.path().join("src/foo.ts"),
        "export function greet(name: string) {\n  return `hello ${name}`;\n}\n",
    )
    .unwrap();
    dir
}

#[test]
fn link_whole_line() {
    let dir = project();
    let output = run(dir.path(), &["link", "src/foo.ts", "1"]);
    assert!(output.status.success(), "link failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "src/foo.ts#L1");
}

#[test]
fn link_line_range_and_columns() {
    let dir = project();
    assert_eq!(stdout(&run(dir.path(), &["link", "src/foo.ts", "1", "3"])), "src/foo.ts#L1-L3");
    assert_eq!(stdout(&run(dir.path(), &["link", "src/foo.ts", "2:3", "2:9"])), "src/foo.ts#L2C3-L2C9");
}

#[test]
fn link_column_block_and_portable() {
    let dir = project();
    let block = run(dir.path(), &["link", "src/foo.ts", "1:1", "2:3", "--rectangular"]);
    assert_eq!(stdout(&block), "src/foo.ts##L1C1-L2C3");

    let portable = run(dir.path(), &["link", "src/foo.ts", "2", "--portable"]);
    assert_eq!(stdout(&portable), "src/foo.ts#L2~#~L~-~C~");
}

#[test]
fn link_uses_configured_delimiters() {
    let dir = project();
    std::fs::write(
        dir.path().join(".rangelink.toml"),
        "[delimiters]\nline = \"line\"\nposition = \"col\"\nrange = \"to\"\n",
    )
    .unwrap();
    let output = run(dir.path(), &["link", "src/foo.ts", "1:8", "1:16"]);
    assert_eq!(stdout(&output), "src/foo.ts#line1col8toline1col16");
}

#[test]
fn link_to_missing_file_fails() {
    let dir = project();
    let output = run(dir.path(), &["link", "src/nope.ts", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File Not Found"));
}

#[test]
fn parse_prints_json() {
    let dir = project();
    let output = run(dir.path(), &["parse", "src/foo.ts#L10C5-L10C16", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["reference_path"], "src/foo.ts");
    assert_eq!(value["link_type"], "Regular");
    assert_eq!(value["selections"]["selections"][0]["start"]["line"], 9);
    assert_eq!(value["selections"]["selections"][0]["end"]["character"], 15);
}

#[test]
fn parse_plain_text_is_not_a_link() {
    let dir = project();
    let output = run(dir.path(), &["parse", "not a link at all"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not A RangeLink"));
}

#[test]
fn show_prints_referenced_text() {
    let dir = project();
    let output = run(dir.path(), &["show", "src/foo.ts#L2C3-L2C9"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "return");
}

#[test]
fn validate_reports_every_issue() {
    let dir = project();
    std::fs::write(
        dir.path().join(".rangelink.toml"),
        "[delimiters]\nline = \"L\"\nposition = \"l\"\nhash = \"##\"\n",
    )
    .unwrap();
    let output = run(dir.path(), &["validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("`hash` must be exactly one character"), "{stderr}");
    assert!(stderr.contains("`position` must differ"), "{stderr}");
}

#[test]
fn validate_accepts_defaults() {
    let dir = project();
    let output = run(dir.path(), &["validate"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Delimiters valid"));
}

#[test]
fn check_passes_then_flags_broken_links() {
    let dir = project();
    std::fs::write(dir.path().join("README.md"), "Greeting lives at src/foo.ts#L1-L3.\n").unwrap();
    let ok = run(dir.path(), &["check"]);
    assert!(ok.status.success(), "check failed: {}", stdout(&ok));
    assert_eq!(stdout(&ok), "All 1 links valid");

    std::fs::write(
        dir.path().join("README.md"),
        "Greeting lives at src/foo.ts#L1-L3.\nGone: src/foo.ts#L40 and src/bar.ts#L1\n",
    )
    .unwrap();
    let broken = run(dir.path(), &["check"]);
    assert_eq!(broken.status.code(), Some(1));
    let out = stdout(&broken);
    assert!(out.contains("BROKEN  README.md:2:7  src/foo.ts#L40"), "{out}");
    assert!(out.contains("src/bar.ts#L1"), "{out}");
    assert!(out.ends_with("2 of 3 links broken"), "{out}");
}

#[test]
fn check_reports_unreadable_targets_with_their_cause() {
    let dir = project();
    std::fs::write(dir.path().join("NOTES.md"), "Layout: src#L1\n").unwrap();
    let output = run(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("BROKEN  NOTES.md:1:9  src#L1  (io: "), "{out}");
    assert!(!out.contains("file not found"), "{out}");
}

#[test]
fn link_to_empty_line_and_back() {
    let dir = project();
    std::fs::write(dir.path().join("src/gap.txt"), "first\n\nthird\n").unwrap();
    let output = run(dir.path(), &["link", "src/gap.txt", "2"]);
    assert!(output.status.success(), "link failed: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "src/gap.txt#L2");

    let shown = run(dir.path(), &["show", "src/gap.txt#L2"]);
    assert!(shown.status.success());
    assert_eq!(stdout(&shown), "");
}

#[test]
fn link_refuses_path_ending_in_hash() {
    let dir = project();
    std::fs::create_dir_all(dir.path().join("lang")).unwrap();
    std::fs::write(dir.path().join("lang/C#"), "int main;\n").unwrap();
    let output = run(dir.path(), &["link", "lang/C#", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Path Ends With Hash"));
}

#[test]
fn not_a_link_message_uses_configured_delimiters() {
    let dir = project();
    std::fs::write(dir.path().join(".rangelink.toml"), "[delimiters]\nline = \"line\"\nhash = \"!\"\n").unwrap();
    let output = run(dir.path(), &["parse", "src/foo.ts#L1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("`!line<line>`"), "{stderr}");
}
