use ap_domain::config::{Config, ConfigSeverity};
use ap_kb::{KnowledgeSource, RestKbClient};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("archplan doctor");
    println!("===============\n");

    let mut all_passed = true;

    check_config_file(config_path);
    check_config_validation(config, &mut all_passed);
    check_knowledge_base(config, &mut all_passed).await;
    check_llm_credential(config, &mut all_passed);

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

/// Informational only: a missing file means defaults.
fn check_config_file(config_path: &str) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file",
        true,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
        return;
    }

    print_check(
        "Config validation",
        error_count == 0,
        format!("{} issue(s) ({} error(s))", issues.len(), error_count),
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        *all_passed = false;
    }
}

async fn check_knowledge_base(config: &Config, all_passed: &mut bool) {
    let url = &config.kb.base_url;
    let outcome = match RestKbClient::new(&config.kb) {
        Ok(client) => client.health().await,
        Err(e) => Err(e),
    };

    let (ok, detail) = match outcome {
        Ok(body) => {
            let status = body
                .get("status")
                .and_then(|s| s.as_str())
                .unwrap_or("reachable");
            (true, format!("{url} ({status})"))
        }
        Err(e) => (false, format!("{url} ({e})")),
    };
    print_check("Knowledge base reachable", ok, detail);

    if !ok {
        *all_passed = false;
    }
}

fn check_llm_credential(config: &Config, all_passed: &mut bool) {
    let ok = ap_providers::resolve_api_key(&config.llm.auth).is_some();
    let source = match (&config.llm.auth.key, &config.llm.auth.env) {
        (Some(_), _) => "inline key".to_string(),
        (None, Some(env)) => format!("env {env}"),
        (None, None) => "none configured".to_string(),
    };

    print_check(
        "Completion model credential",
        ok,
        format!("{} via {source}", config.llm.model),
    );

    if !ok {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
