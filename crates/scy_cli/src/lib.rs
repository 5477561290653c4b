#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-cli
//!
//! The command-line front end: selects a built-in demonstration protocol
//! (the SPDL parser/type-checker collaborator is out of scope, so there is
//! no file format to read — see [`scy_spdl`]), installs its declared
//! inverse-key pairs on a fresh [`scy_model::Verifier`], checks every claim
//! the protocol declares through [`scy_claims::check_claim`], and reports
//! the outcome through a [`scy_claims::TextObserver`].

pub mod cli;
pub mod manifest;
pub mod scenarios;

use log::info;

use scy_base::Interner;
use scy_claims::{check_claim, ClaimResult, ClaimTarget, TextObserver};
use scy_know::InverseKeyTable;
use scy_model::{Diagnostic, PartnerDef, RoleEvent, Verifier};

use cli::Cli;
use manifest::Manifest;

/// One claim's outcome, labelled with where it came from for the report.
pub struct Outcome {
    pub protocol: String,
    pub role: String,
    pub step: usize,
    pub result: ClaimResult,
}

/// Runs every claim in the selected protocol and returns one [`Outcome`]
/// per claim, the accumulated [`TextObserver`] lines, and every
/// [`Diagnostic`] raised along the way (always-true claims, label
/// collisions, untyped-variable caveats) for the front end to report
/// alongside the pass/fail summary.
pub fn run(cli: &Cli) -> Result<(Vec<Outcome>, Vec<String>, Vec<Diagnostic>), Box<dyn std::error::Error>> {
    let manifest = match &cli.project {
        Some(dir) => Some(Manifest::load(dir)?),
        None => None,
    };

    // An explicit positional argument always wins; the manifest only fills
    // in the default when the caller left it at clap's own default.
    let protocol_name = if cli.protocol == "ns-lowe" {
        manifest.as_ref().and_then(|m| m.protocol.clone()).unwrap_or_else(|| cli.protocol.clone())
    } else {
        cli.protocol.clone()
    };

    let scenario = scenarios::find(&protocol_name)
        .ok_or_else(|| format!("unknown protocol '{protocol_name}' (try --list)"))?;

    if let Some(filter) = &cli.filter_protocol {
        if !scenario.name.contains(filter.as_str()) {
            return Ok((Vec::new(), vec![format!("protocol '{}' excluded by --filter-protocol", scenario.name)], Vec::new()));
        }
    }

    info!("loaded protocol '{}': {}", scenario.name, scenario.description);

    let mut interner = Interner::new();
    let (protocol, labels, scope, inverse_pairs) = (scenario.build)(&mut interner);

    let mut inverse_table = InverseKeyTable::new();
    for (a, b) in inverse_pairs {
        inverse_table.register(a, b);
    }

    let mut bounds = cli.bounds();
    if let Some(manifest) = &manifest {
        bounds.max_runs = bounds.max_runs.or(manifest.bounds.max_runs);
        bounds.max_proof_depth = bounds.max_proof_depth.or(manifest.bounds.max_proof_depth);
        bounds.max_trace_length = bounds.max_trace_length.or(manifest.bounds.max_trace_length);
        bounds.max_intruder_actions = bounds.max_intruder_actions.or(manifest.bounds.max_intruder_actions);
        if let Some(max_attacks) = manifest.bounds.max_attacks {
            bounds.max_attacks = Some(max_attacks);
        }
    }
    let compromise = cli.compromise();

    let mut verifier = Verifier::new(bounds, compromise, cli.seed);
    verifier.inverse_table = std::rc::Rc::new(inverse_table);
    verifier.scope = scope;
    let protocol_index = verifier.add_protocol(protocol, labels);

    let targets = claim_targets(&verifier, &interner, protocol_index, cli.filter_label.as_deref());
    let total = targets.len();
    let partner_def: PartnerDef = cli.partner_def();
    let search_config = cli.search_config();

    let mut observer = TextObserver::default();
    let mut outcomes = Vec::with_capacity(total);
    for (index, (role_name, target)) in targets.into_iter().enumerate() {
        info!("checking claim {}/{total} on role '{role_name}'", index + 1);
        let result = check_claim(&mut verifier, &target, &search_config, partner_def, &mut observer)?;
        outcomes.push(Outcome { protocol: scenario.name.to_string(), role: role_name, step: target.step, result });
    }

    Ok((outcomes, observer.lines, verifier.diagnostics))
}

/// One `(role name, claim target)` pair per `Claim` event in the compiled
/// protocol, in role/step order, filtered by `--filter-label` on the
/// claim's own label text.
fn claim_targets(
    verifier: &Verifier,
    interner: &Interner,
    protocol_index: usize,
    filter_label: Option<&str>,
) -> Vec<(String, ClaimTarget)> {
    let protocol = &verifier.protocols[protocol_index];
    let mut targets = Vec::new();
    for (role_index, role) in protocol.roles.iter().enumerate() {
        for (step, event) in role.events.iter().enumerate() {
            if let RoleEvent::Claim { kind, parameter, .. } = event {
                if let Some(filter) = filter_label {
                    if !interner.resolve(event.label()).contains(filter) {
                        continue;
                    }
                }
                let role_name = interner.resolve(role.name).to_string();
                targets.push((role_name, ClaimTarget { protocol_index, role_index, step, kind: *kind, parameter: parameter.clone() }));
            }
        }
    }
    targets
}

pub fn describe_result(result: &ClaimResult) -> &'static str {
    match result {
        ClaimResult::Verified => "verified",
        ClaimResult::Bounded => "bounded (no attack found within the configured bounds)",
        ClaimResult::Falsified(_) => "falsified",
        ClaimResult::TimeOut => "time-out",
        ClaimResult::AlwaysTrue => "always true",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn ns_lowe_checks_both_nonce_secrets() {
        let cli = Cli::parse_from(["scy", "ns-lowe"]);
        let (outcomes, _lines, _diagnostics) = run(&cli).unwrap();
        assert_eq!(outcomes.len(), 2);
    }

    #[test]
    fn always_true_scenario_needs_no_search() {
        let cli = Cli::parse_from(["scy", "always-true"]);
        let (outcomes, _lines, diagnostics) = run(&cli).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].result, ClaimResult::AlwaysTrue));
        assert!(diagnostics.iter().any(|d| matches!(d, Diagnostic::AlwaysTrue { .. })));
    }

    #[test]
    fn unknown_protocol_name_is_an_error() {
        let cli = Cli::parse_from(["scy", "does-not-exist"]);
        assert!(run(&cli).is_err());
    }
}
