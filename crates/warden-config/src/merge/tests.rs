use super::*;

fn parse(src: &str) -> toml::Value {
    toml::from_str(src).unwrap()
}

#[test]
fn test_merge_tables_per_key() {
    let mut base = parse(
        r#"
        [approval]
        ttl_secs = 120
        retry_window_secs = 60
        "#,
    );
    let overlay = parse("[approval]\nttl_secs = 300\n");
    let mut sources = FieldSources::new();

    deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

    assert_eq!(base["approval"]["ttl_secs"].as_integer(), Some(300));
    assert_eq!(base["approval"]["retry_window_secs"].as_integer(), Some(60));
    assert_eq!(sources.get("approval.ttl_secs"), Some(&ConfigLayer::User));
    assert!(!sources.contains_key("approval.retry_window_secs"));
}

#[test]
fn test_merge_adds_new_rule_tables() {
    let mut base = parse("[policy.modules.FileSystem.read]\naction = \"allow\"\n");
    let overlay = parse("[policy.modules.Shell.bash]\naction = \"deny\"\n");
    let mut sources = FieldSources::new();

    deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::System, &mut sources);

    assert_eq!(
        base["policy"]["modules"]["Shell"]["bash"]["action"].as_str(),
        Some("deny")
    );
    assert_eq!(
        base["policy"]["modules"]["FileSystem"]["read"]["action"].as_str(),
        Some("allow")
    );
    assert_eq!(
        sources.get("policy.modules.Shell.bash.action"),
        Some(&ConfigLayer::System)
    );
}

#[test]
fn test_arrays_replace() {
    let mut base = parse("[logging]\ndirectives = [\"a=debug\", \"b=info\"]\n");
    let overlay = parse("[logging]\ndirectives = [\"c=trace\"]\n");
    deep_merge(&mut base, &overlay);
    let directives = base["logging"]["directives"].as_array().unwrap();
    assert_eq!(directives.len(), 1);
}

#[test]
fn test_restrictions_allow_tightening_new_rule() {
    let baseline = parse("[policy]\ndefault_action = \"ask\"\n");
    let workspace = parse("[policy.modules.Net.fetch]\naction = \"deny\"\n");
    let mut merged = baseline.clone();
    deep_merge(&mut merged, &workspace);

    enforce_restrictions(&mut merged, &baseline, &workspace);

    assert_eq!(
        merged["policy"]["modules"]["Net"]["fetch"]["action"].as_str(),
        Some("deny")
    );
}

#[test]
fn test_restrictions_new_rule_cannot_exceed_default() {
    let baseline = parse("[policy]\ndefault_action = \"ask\"\n");
    let workspace = parse("[policy.modules.Net.fetch]\naction = \"allow\"\n");
    let mut merged = baseline.clone();
    deep_merge(&mut merged, &workspace);

    enforce_restrictions(&mut merged, &baseline, &workspace);

    assert_eq!(
        merged["policy"]["modules"]["Net"]["fetch"]["action"].as_str(),
        Some("ask")
    );
}

#[test]
fn test_restrictions_clamp_blanket_duration() {
    let baseline = parse("[approval]\nblanket_allow_secs = 600\n");
    let workspace = parse("[approval]\nblanket_allow_secs = 3600\n");
    let mut merged = baseline.clone();
    deep_merge(&mut merged, &workspace);

    enforce_restrictions(&mut merged, &baseline, &workspace);

    assert_eq!(
        merged["approval"]["blanket_allow_secs"].as_integer(),
        Some(600)
    );
}
