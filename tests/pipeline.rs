use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use cricket_insights::calculate::QueryOutput;
use cricket_insights::config::AppConfig;
use cricket_insights::dashboard::{build_report, default_panels, Report};
use cricket_insights::storage::load_table;
use cricket_insights::{AnalysisError, Dataset, DatasetSummary};

const MATCHES_CSV: &str = "\
id,season,city,team1,team2,winner,win_by_runs,win_by_wickets,venue
1,2017,Hyderabad,Sunrisers Hyderabad,Royal Challengers Bangalore,Sunrisers Hyderabad,35,0,Rajiv Gandhi Intl Stadium
2,2017,Pune,Mumbai Indians,Rising Pune Supergiant,Rising Pune Supergiant,0,7,MCA Stadium
3,2017,Rajkot,Gujarat Lions,Kolkata Knight Riders,Kolkata Knight Riders,0,10,Saurashtra Cricket Association Stadium
4,2018,Mumbai,Mumbai Indians,Chennai Super Kings,Chennai Super Kings,0,1,Wankhede Stadium
5,2018,Bengaluru,Royal Challengers Bangalore,Kolkata Knight Riders,,0,0,M Chinnaswamy Stadium
";

const DELIVERIES_CSV: &str = "\
match_id,inning,over,ball,batsman,non_striker,bowler,batsman_runs,extra_runs,total_runs,player_dismissed,dismissal_kind
1,1,1,1,DA Warner,S Dhawan,TS Mills,4,0,4,,
1,1,1,2,DA Warner,S Dhawan,TS Mills,0,1,1,,
1,1,1,3,DA Warner,S Dhawan,TS Mills,0,0,0,DA Warner,caught
1,1,1,4,S Dhawan,MC Henriques,TS Mills,6,0,6,,
2,1,1,1,AM Rahane,SPD Smith,B Kumar,2,0,2,,
2,1,1,2,AM Rahane,SPD Smith,B Kumar,0,0,0,SPD Smith,run out
3,1,1,1,CA Lynn,SP Narine,B Kumar,6,0,6,,
4,1,1,1,SK Raina,AT Rayudu,JJ Bumrah,1,0,1,,
4,1,1,2,AT Rayudu,SK Raina,JJ Bumrah,0,0,0,AT Rayudu,bowled
99,1,1,1,Unknown Batter,Unknown Partner,Unknown Bowler,3,0,3,,
";

fn write_fixture(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn prepare(dir: &TempDir) -> Dataset {
    let matches = write_fixture(dir.path(), "matches.csv", MATCHES_CSV);
    let deliveries = write_fixture(dir.path(), "deliveries.csv", DELIVERIES_CSV);

    let config = AppConfig::default();
    Dataset::prepare(
        &load_table(&matches).unwrap(),
        &load_table(&deliveries).unwrap(),
        &config.alias_table(),
    )
    .unwrap()
}

fn report() -> Report {
    let dir = TempDir::new().unwrap();
    build_report(&prepare(&dir), &default_panels()).unwrap()
}

fn panel<'a>(report: &'a Report, name: &str) -> &'a QueryOutput {
    &report
        .panels
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("missing panel {}", name))
        .result
}

fn ranked(output: &QueryOutput) -> Vec<(String, u64)> {
    match output {
        QueryOutput::Ranked { entries } => entries.iter().map(|e| (e.key.to_string(), e.value)).collect(),
        QueryOutput::Table { entries } => entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        other => panic!("expected ranked or table output, got {:?}", other),
    }
}

fn owned(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_summary() {
    let dir = TempDir::new().unwrap();
    let dataset = prepare(&dir);

    assert_eq!(
        dataset.summary(),
        DatasetSummary {
            matches: 5,
            events: 10,
            unmatched_events: 1,
            seasons: 2,
        }
    );
}

#[test]
fn test_top_batsmen() {
    let report = report();
    assert_eq!(
        ranked(panel(&report, "top_batsmen")),
        owned(&[
            ("CA Lynn", 6),
            ("S Dhawan", 6),
            ("DA Warner", 4),
            ("Unknown Batter", 3),
            ("AM Rahane", 2),
            ("SK Raina", 1),
            ("AT Rayudu", 0),
        ])
    );
}

#[test]
fn test_top_bowlers_ignore_run_outs() {
    let report = report();
    assert_eq!(
        ranked(panel(&report, "top_bowlers")),
        owned(&[("JJ Bumrah", 1), ("TS Mills", 1)])
    );
}

#[test]
fn test_season_wins_table() {
    let report = report();
    assert_eq!(
        ranked(panel(&report, "season_wins")),
        owned(&[
            ("2017 / Kolkata Knight Riders", 1),
            ("2017 / Rising Pune Supergiant", 1),
            ("2017 / Sunrisers Hyderabad", 1),
            ("2018 / Chennai Super Kings", 1),
        ])
    );
}

#[test]
fn test_dominant_team_ties_break_by_name() {
    let report = report();
    let QueryOutput::Argmax { entries } = panel(&report, "dominant_team_per_season") else {
        panic!("expected argmax output");
    };

    let winners: Vec<(String, String, u64)> = entries
        .iter()
        .map(|(k, e)| (k.to_string(), e.value.clone(), e.count))
        .collect();
    assert_eq!(
        winners,
        vec![
            ("2017".to_string(), "Kolkata Knight Riders".to_string(), 1),
            ("2018".to_string(), "Chennai Super Kings".to_string(), 1),
        ]
    );
}

#[test]
fn test_runs_per_season_skips_unmatched() {
    let report = report();
    assert_eq!(
        ranked(panel(&report, "runs_per_season")),
        owned(&[("2017", 19), ("2018", 1)])
    );
}

#[test]
fn test_consistent_batsmen() {
    let report = report();
    let QueryOutput::Ratio { entries } = panel(&report, "consistent_batsmen") else {
        panic!("expected ratio output");
    };

    let averages: Vec<(String, Option<f64>)> = entries
        .iter()
        .map(|e| (e.key.to_string(), e.value.value()))
        .collect();
    assert_eq!(
        averages,
        vec![
            ("DA Warner".to_string(), Some(4.0)),
            ("AT Rayudu".to_string(), Some(0.0)),
            ("AM Rahane".to_string(), None),
            ("CA Lynn".to_string(), None),
            ("S Dhawan".to_string(), None),
            ("SK Raina".to_string(), None),
            ("Unknown Batter".to_string(), None),
        ]
    );
}

#[test]
fn test_most_wickets_in_match() {
    let report = report();
    assert_eq!(
        ranked(panel(&report, "most_wickets_in_match")),
        owned(&[("1 / TS Mills", 1), ("4 / JJ Bumrah", 1)])
    );
}

#[test]
fn test_margin_histograms() {
    let report = report();
    let QueryOutput::Histogram { histogram } = panel(&report, "win_by_runs_distribution") else {
        panic!("expected histogram output");
    };

    assert_eq!(histogram.total, 5);
    assert_eq!(histogram.bins.len(), 30);
    assert_eq!(histogram.bins[0].count, 4);
    assert_eq!(histogram.bins[29].count, 1);
}

#[test]
fn test_report_json_nulls_undefined_averages() {
    let report = report();
    let json = serde_json::to_value(&report).unwrap();

    let consistent = json["panels"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "consistent_batsmen")
        .unwrap();
    assert_eq!(consistent["result"]["entries"][0]["value"], 4.0);
    assert!(consistent["result"]["entries"][2]["value"].is_null());
}

#[test]
fn test_jsonl_deliveries_match_csv() {
    let dir = TempDir::new().unwrap();
    let csv_dataset = prepare(&dir);

    let jsonl: String = DELIVERIES_CSV
        .lines()
        .skip(1)
        .map(|line| {
            let cells: Vec<&str> = line.split(',').collect();
            let mut object = serde_json::json!({
                "match_id": cells[0].parse::<u64>().unwrap(),
                "batter": cells[4],
                "bowler": cells[6],
                "batsman_runs": cells[7].parse::<u64>().unwrap(),
                "extra_runs": cells[8].parse::<u64>().unwrap(),
            });
            if !cells[11].is_empty() {
                object["player_dismissed"] = cells[10].into();
                object["dismissal_kind"] = cells[11].into();
            } else {
                object["dismissal_kind"] = serde_json::Value::Null;
            }
            format!("{}\n", object)
        })
        .collect();

    let matches = load_table(&dir.path().join("matches.csv")).unwrap();
    let deliveries = load_table(&write_fixture(dir.path(), "deliveries.jsonl", &jsonl)).unwrap();
    let jsonl_dataset = Dataset::prepare(&matches, &deliveries, &AppConfig::default().alias_table()).unwrap();

    assert_eq!(jsonl_dataset.summary(), csv_dataset.summary());
    let from_csv = build_report(&csv_dataset, &default_panels()).unwrap();
    let from_jsonl = build_report(&jsonl_dataset, &default_panels()).unwrap();
    for (a, b) in from_csv.panels.iter().zip(from_jsonl.panels.iter()) {
        assert_eq!(a.result, b.result, "panel {}", a.name);
    }
}

#[test]
fn test_missing_required_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let matches = write_fixture(dir.path(), "matches.csv", "id,season,winner,win_by_runs\n1,2017,SRH,35\n");
    let deliveries = write_fixture(dir.path(), "deliveries.csv", DELIVERIES_CSV);

    let err = Dataset::prepare(
        &load_table(&matches).unwrap(),
        &load_table(&deliveries).unwrap(),
        &AppConfig::default().alias_table(),
    )
    .unwrap_err();

    assert!(matches!(err, AnalysisError::Schema(_)));
    assert!(err.to_string().contains("win_by_wickets"));
}
