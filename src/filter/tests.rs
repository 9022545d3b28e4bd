use super::*;
use crate::models::{HolderShare, LockState};
use crate::tests::common::create_test_pair;

#[test]
fn test_default_thresholds_pass() {
    let pair = create_test_pair("good", 15_000.0, 20_000.0, LockState::Locked, 3.0);
    let result = evaluate(&pair, &Rules::default());
    assert!(result.pass);
    assert!(result.reasons.is_empty());
}

#[test]
fn test_holder_concentration_only_failure() {
    let pair = create_test_pair("whale", 15_000.0, 20_000.0, LockState::Locked, 6.0);
    let result = evaluate(&pair, &Rules::default());
    assert!(!result.pass);
    assert_eq!(result.reasons, vec!["holder_concentration".to_string()]);
}

#[test]
fn test_low_liquidity_always_fails() {
    let rules = Rules::default();
    let cases = [
        (9_999.99, 1_000_000.0, LockState::Burned, 0.1),
        (0.0, 0.0, LockState::Unknown, 100.0),
        (5_000.0, 20_000.0, LockState::Locked, 3.0),
    ];
    for (liquidity, volume, lock, holder) in cases {
        let pair = create_test_pair("thin", liquidity, volume, lock, holder);
        let result = evaluate(&pair, &rules);
        assert!(!result.pass, "liquidity {} should fail", liquidity);
        assert!(result.reasons.contains(&REASON_LIQUIDITY.to_string()));
    }
}

#[test]
fn test_reports_every_failed_rule() {
    let pair = create_test_pair("bad", 10.0, 10.0, LockState::Unlocked, 50.0);
    let result = evaluate(&pair, &Rules::default());
    assert_eq!(
        result.reasons,
        vec!["liquidity", "volume", "lp_lock", "holder_concentration"]
    );
}

#[test]
fn test_thresholds_are_inclusive() {
    let pair = create_test_pair("edge", 10_000.0, 10_000.0, LockState::Burned, 5.0);
    assert!(evaluate(&pair, &Rules::default()).pass);
}

#[test]
fn test_disabled_rules_are_ignored() {
    let rules = Rules {
        liquidity: ThresholdRule::off(10_000.0),
        volume: ThresholdRule::off(10_000.0),
        lp_lock_required: false,
        holder_concentration: ThresholdRule::off(5.0),
        ..Rules::default()
    };
    let pair = create_test_pair("anything", 0.0, 0.0, LockState::Unknown, 100.0);
    assert!(evaluate(&pair, &rules).pass);
}

#[test]
fn test_unknown_lock_state_fails() {
    let pair = create_test_pair("unknown", 15_000.0, 20_000.0, LockState::Unknown, 3.0);
    let result = evaluate(&pair, &Rules::default());
    assert_eq!(result.reasons, vec!["lp_lock"]);
}

#[test]
fn test_missing_holder_data_fails() {
    let mut pair = create_test_pair("no_holders", 15_000.0, 20_000.0, LockState::Locked, 3.0);
    pair.holders.clear();
    let result = evaluate(&pair, &Rules::default());
    assert_eq!(result.reasons, vec!["holder_concentration"]);
}

#[test]
fn test_holder_rule_uses_largest_holder() {
    let mut pair = create_test_pair("spread", 15_000.0, 20_000.0, LockState::Locked, 4.0);
    // Cumulative share is 12% but no single holder exceeds 5%.
    pair.holders.push(HolderShare { holder: "w2".into(), percent: 4.0 });
    pair.holders.push(HolderShare { holder: "w3".into(), percent: 4.0 });
    assert!(evaluate(&pair, &Rules::default()).pass);
}

#[test]
fn test_volume_spike_rule() {
    let rules = Rules {
        volume_spike: ThresholdRule::on(2.0),
        ..Rules::default()
    };
    let mut pair = create_test_pair("spike", 15_000.0, 20_000.0, LockState::Locked, 3.0);

    pair.volume_window_ratio = None;
    assert_eq!(evaluate(&pair, &rules).reasons, vec!["volume_spike"]);

    pair.volume_window_ratio = Some(1.5);
    assert_eq!(evaluate(&pair, &rules).reasons, vec!["volume_spike"]);

    pair.volume_window_ratio = Some(2.5);
    assert!(evaluate(&pair, &rules).pass);
}

#[test]
fn test_nan_readings_never_pass() {
    let mut pair = create_test_pair("nan", 15_000.0, 20_000.0, LockState::Locked, 3.0);
    pair.liquidity_usd = f64::NAN;
    let result = evaluate(&pair, &Rules::default());
    assert_eq!(result.reasons, vec!["liquidity"]);
}

#[test]
fn test_chain_rule() {
    let rules = Rules {
        chain: Some("solana".to_string()),
        ..Rules::default()
    };
    let mut pair = create_test_pair("chain", 15_000.0, 20_000.0, LockState::Locked, 3.0);

    pair.chain_id = Some("Solana".to_string());
    assert!(evaluate(&pair, &rules).pass);

    pair.chain_id = Some("ethereum".to_string());
    assert_eq!(evaluate(&pair, &rules).reasons, vec!["chain"]);

    pair.chain_id = None;
    assert_eq!(evaluate(&pair, &rules).reasons, vec!["chain"]);
}

#[test]
fn test_mint_allowlist() {
    let mut rules = Rules::default();
    let pair = create_test_pair("listed", 15_000.0, 20_000.0, LockState::Locked, 3.0);

    rules.mint_allowlist = vec!["other-mint".to_string()];
    assert_eq!(evaluate(&pair, &rules).reasons, vec!["mint_allowlist"]);

    rules.mint_allowlist.push(pair.base_token.address.clone());
    assert!(evaluate(&pair, &rules).pass);
}

#[test]
fn test_validate_rules() {
    assert!(Rules::default().validate().is_ok());

    let rules = Rules {
        liquidity: ThresholdRule::on(-1.0),
        ..Rules::default()
    };
    assert!(rules.validate().is_err());

    let rules = Rules {
        holder_concentration: ThresholdRule::on(150.0),
        ..Rules::default()
    };
    assert!(rules.validate().is_err());
}

#[test]
fn test_describe_lists_enabled_rules() {
    let lines = Rules::default().describe();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().any(|l| l.contains("liquidity")));
    assert!(!lines.iter().any(|l| l.contains("spike")));
}
