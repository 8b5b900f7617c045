use std::path::PathBuf;

use sheetjoin_recon::config::ReconConfig;
use sheetjoin_recon::engine::{read_source, run, SourceSet};
use sheetjoin_recon::error::ReconError;
use sheetjoin_recon::model::{Grade, MatchStatus, SourceKind};
use sheetjoin_recon::{reconcile, scan_answers, scan_roster};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_sources() -> SourceSet {
    let dir = fixtures_dir();
    SourceSet::new(
        vec![dir.join("nomes_9º.txt"), dir.join("nomes_8º.txt")],
        vec![dir.join("respostas_9º.txt"), dir.join("respostas_8º.txt")],
    )
}

// -------------------------------------------------------------------------
// Full run
// -------------------------------------------------------------------------

#[test]
fn fixture_run_counts() {
    let report = run(&ReconConfig::default(), &fixture_sources()).unwrap();
    let s = &report.outcome.stats;

    assert_eq!(s.roster_count, 8);
    assert_eq!(s.answers_count, 6);
    // 12503 appears twice on the roster and expands to two matched rows
    assert_eq!(s.matched, 6);
    assert_eq!(s.roster_only, 2);
    assert_eq!(s.answers_only, 1);
    assert!((s.match_rate - 0.75).abs() < 1e-9);

    assert!(report.issues.is_empty());
    assert_eq!(report.slot_overflows, 0);
    assert_eq!(report.meta.slot_width, 150);
}

#[test]
fn fixture_run_rows() {
    let report = run(&ReconConfig::default(), &fixture_sources()).unwrap();
    let out = &report.outcome;

    let keys: Vec<&str> = out.matched.iter().map(|m| m.id_key.as_str()).collect();
    assert_eq!(keys, vec!["12345", "12401", "12503", "12503", "20010", "20021"]);

    let first = &out.matched[0];
    assert_eq!(first.match_status, MatchStatus::Matched);
    assert_eq!(first.name(), "JOAO SILVA");
    assert_eq!(first.room_label("?"), "7AM");
    assert_eq!(first.grade, Grade::Year8);
    assert_eq!(first.answer_run(), "ABCDE*ABCDE");
    assert_eq!(first.slots().unwrap().get(5), Some('*'));

    let pedro: Vec<_> = out.matched.iter().filter(|m| m.id_key == "12503").collect();
    assert_eq!(pedro[0].room_label("?"), "8AM");
    assert_eq!(pedro[0].answers, pedro[1].answers);

    let ana = &out.matched[4];
    assert_eq!(ana.name(), "ANA LIMA");
    assert_eq!(ana.room_label("?"), "1CM");
    assert_eq!(ana.grade, Grade::Year9);

    let roster_only: Vec<&str> = out.roster_only.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(roster_only, vec!["LUCAS PEREIRA", "CARLA DIAS"]);
    assert_eq!(out.answers_only[0].id_raw, "000999998");
}

#[test]
fn fixture_run_summaries() {
    let report = run(&ReconConfig::default(), &fixture_sources()).unwrap();

    let lengths = report.answer_lengths.as_ref().unwrap();
    assert_eq!(lengths.min, 4);
    assert_eq!(lengths.max, 11);

    assert_eq!(report.roster_rooms.get("7AM"), Some(&2));
    assert_eq!(report.roster_rooms.get("8AM"), Some(&3));
    assert_eq!(report.roster_rooms.get("1CM"), Some(&3));

    // files come out in sorted order per kind, rosters first
    let files: Vec<(SourceKind, Grade, usize)> =
        report.files.iter().map(|f| (f.kind, f.grade, f.records)).collect();
    assert_eq!(
        files,
        vec![
            (SourceKind::Roster, Grade::Year8, 5),
            (SourceKind::Roster, Grade::Year9, 3),
            (SourceKind::Answers, Grade::Year8, 4),
            (SourceKind::Answers, Grade::Year9, 2),
        ]
    );
}

#[test]
fn run_is_reproducible() {
    let a = run(&ReconConfig::default(), &fixture_sources()).unwrap();
    let b = run(&ReconConfig::default(), &fixture_sources()).unwrap();
    assert_eq!(a.outcome, b.outcome);
}

#[test]
fn result_serializes_to_json() {
    let report = run(&ReconConfig::default(), &fixture_sources()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcome"]["stats"]["matched"], 6);
    assert_eq!(json["outcome"]["matched"][0]["match_status"], "matched");
    assert_eq!(json["outcome"]["matched"][0]["grade"], "8º Ano");
    let slots = json["outcome"]["matched"][0]["answers"]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 150);
    assert_eq!(slots[5], "*");
    assert_eq!(slots[149], "");
}

#[test]
fn grade_folder_names_grade_the_records() {
    let dir = tempfile::tempdir().unwrap();
    let grade_dir = dir.path().join("9° ano");
    std::fs::create_dir(&grade_dir).unwrap();
    std::fs::write(grade_dir.join("nomes.txt"), "2001.0\tANA LIMA\n").unwrap();
    std::fs::write(grade_dir.join("respostas.txt"), "N000200104ABCD\nN000999998EE\n").unwrap();

    let sources = SourceSet::new(
        vec![grade_dir.join("nomes.txt")],
        vec![grade_dir.join("respostas.txt")],
    );
    let report = run(&ReconConfig::default(), &sources).unwrap();

    assert!(report.files.iter().all(|f| f.grade == Grade::Year9));
    assert_eq!(report.outcome.matched[0].grade, Grade::Year9);
    assert_eq!(report.outcome.answers_only[0].grade, Grade::Year9);
}

// -------------------------------------------------------------------------
// Failure isolation
// -------------------------------------------------------------------------

#[test]
fn undecodable_file_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("nomes_zz.txt");
    std::fs::write(&broken, b"1.1\t\xff\xfe\n").unwrap();

    let mut sources = fixture_sources();
    sources.roster_files.push(broken.clone());
    let report = run(&ReconConfig::default(), &sources).unwrap();

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].path, broken.display().to_string());
    assert_eq!(report.outcome.stats.roster_count, 8);
}

#[test]
fn every_file_unreadable_is_empty_post_parse() {
    let dir = tempfile::tempdir().unwrap();
    let sources = SourceSet::new(
        vec![dir.path().join("nomes.txt")],
        vec![fixtures_dir().join("respostas_8º.txt")],
    );
    let err = run(&ReconConfig::default(), &sources).unwrap_err();
    assert_eq!(err, ReconError::EmptyPostParse { kind: SourceKind::Roster });
}

#[test]
fn invalid_configured_pattern_fails_before_scanning() {
    let config = ReconConfig::from_toml(
        r#"
[[roster.room_rules]]
pattern = '(\d+'
"#,
    )
    .unwrap();
    let err = run(&config, &fixture_sources()).unwrap_err();
    assert!(matches!(err, ReconError::InvalidPattern { .. }));
}

// -------------------------------------------------------------------------
// Scanner + merge composition
// -------------------------------------------------------------------------

#[test]
fn scanners_compose_with_merge() {
    let dir = fixtures_dir();
    let names = read_source(&dir.join("nomes_9º.txt")).unwrap();
    let cards = read_source(&dir.join("respostas_9º.txt")).unwrap();

    let roster = scan_roster(names.lines(), "nomes_9º.txt");
    let scan = scan_answers(cards.lines(), "respostas_9º.txt", 150);
    let out = reconcile(&roster, &scan.records);

    assert_eq!(out.matched.len(), 2);
    assert_eq!(out.matched[1].answer_run(), "*BCDA");
    assert_eq!(out.roster_only.len(), 1);
    assert!(out.answers_only.is_empty());
    assert_eq!(out.matched.len() + out.roster_only.len(), roster.len());
    assert_eq!(out.matched.len() + out.answers_only.len(), scan.records.len());
}
