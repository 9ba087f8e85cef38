use cotacao_core::error::CotacaoError;
use cotacao_core::policy::builtin;
use cotacao_core::policy::schema::{OutlierRule, PolicyDef};
use std::path::Path;

pub fn list() -> Result<(), CotacaoError> {
    println!("Available predefined policies:\n");
    for name in builtin::PRESETS {
        let policy = builtin::load_preset(name)?;
        let default_marker = if *name == builtin::DEFAULT_PRESET {
            " [default]"
        } else {
            ""
        };
        println!(
            "  {:<16} {} (v{}){}",
            name, policy.name, policy.version, default_marker
        );
        if let Some(ref desc) = policy.description {
            println!("                   {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), CotacaoError> {
    let policy = builtin::load_preset(preset)?;
    print_explanation(&policy);
    Ok(())
}

fn print_explanation(policy: &PolicyDef) {
    println!("{} (version {})\n", policy.name, policy.version);

    if let Some(ref desc) = policy.description {
        println!("{}\n", desc);
    }

    println!(
        "With {} or more quotes for an item, quotes are screened:\n",
        policy.min_quotes
    );
    match &policy.rule {
        OutlierRule::MeanOfOthers {
            upper_ratio,
            lower_ratio,
        } => {
            println!("  1. Each quote is divided by the mean of the other quotes.");
            println!("     Above {upper_ratio}: excluded as abnormally high.");
            println!("  2. Among the quotes left, the same ratio is recomputed.");
            println!("     Below {lower_ratio}: excluded as abnormally low.");
        }
        OutlierRule::MedianBand {
            upper_fraction,
            lower_fraction,
        } => {
            println!("  Each quote is compared with the median of all quotes.");
            println!("  More than {upper_fraction} above it: excluded as high.");
            println!("  More than {lower_fraction} below it: excluded as low.");
        }
        OutlierRule::Iqr { k } => {
            println!("  Quartiles Q1 and Q3 are computed by linear interpolation.");
            println!("  Above Q3 + {k} x (Q3 - Q1): excluded as high.");
            println!("  Below Q1 - {k} x (Q3 - Q1): excluded as low.");
        }
    }

    println!(
        "\n  Reference price: {} of the remaining quotes.",
        policy.final_statistic
    );
    println!(
        "\nWith fewer than {} quotes nothing is excluded.",
        policy.min_quotes
    );
    println!("  Reference price: {}.\n", policy.small_sample_statistic);
}

pub fn schema() -> Result<(), CotacaoError> {
    print!(
        r#"JSON Policy Schema
==================

A policy file defines how abnormal quotes are excluded and how the
reference price of each item is computed. When you run
`cotacao aggregate --policy-file FILE`, every item of the report is
processed with it independently.

Top-level fields:
  name          (string, required)  Human-readable name of the policy
  description   (string, optional)  What this policy is for
  version       (string, required)  Version identifier (e.g., "1.0")
  min_quotes    (integer, optional) Exclusion runs only for items with at
                                    least this many quotes. Default: 5
  rule          (object, required)  Exclusion rule (see below)
  final_statistic
                (object, optional)  Statistic over the quotes left after
                                    exclusion. Default: {{"kind": "mean"}}
  small_sample_statistic
                (object, optional)  Statistic for items below min_quotes.
                                    Default: {{"kind": "mean"}}

Rule kinds:
  mean_of_others  upper_ratio, lower_ratio
                  High pass over all quotes (value / mean of the others
                  above upper_ratio), then low pass over the quotes left
                  (ratio below lower_ratio).
  median_band     upper_fraction, lower_fraction
                  Excluded when above median x (1 + upper_fraction) or
                  below median x (1 - lower_fraction).
  iqr             k
                  Excluded when outside [Q1 - k x IQR, Q3 + k x IQR].

Statistic kinds:
  mean
  median
  cv_switch       cv_threshold
                  Mean when the population coefficient of variation is
                  below cv_threshold, median otherwise.

Example:
{{
  "name": "Strict band",
  "description": "Drop quotes more than 30% away from the median",
  "version": "1.0",
  "min_quotes": 3,
  "rule": {{ "kind": "median_band", "upper_fraction": "0.3", "lower_fraction": "0.3" }},
  "final_statistic": {{ "kind": "mean" }},
  "small_sample_statistic": {{ "kind": "cv_switch", "cv_threshold": "0.25" }}
}}

Note: numeric parameters must be quoted strings, not bare numbers,
to preserve exact decimal precision (e.g., "1.25" not 1.25).
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), CotacaoError> {
    let policy = cotacao_core::policy::load_policy(file)?;

    println!("Policy '{}' (v{}) is valid.", policy.name, policy.version);
    println!("  {}", policy.rule_text());

    if policy.min_quotes < 3 {
        println!("\nWarnings:");
        println!(
            "  - min_quotes {} screens items with very few quotes",
            policy.min_quotes
        );
    }

    Ok(())
}
