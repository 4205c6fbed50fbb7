//! Writes TypeScript declarations for the refund wire types.
//!
//! Usage: `generate_types [OUTPUT_DIR]` (default: `bindings`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use ts_rs::TS;

use refund_desk::refund::{
    EmailLookupResult, LookupErrorCode, PassHolder, PassType, PaymentInfo, PaymentMethod,
    RefundDecision, RefundRequestData, RefundStatus, RefundStatusRecord, RefundStep,
    StatusLookupResult, SubmissionResult, WiseInfo, ZelleInfo,
};

const OUTPUT_FILE: &str = "refund.ts";

fn declarations() -> Vec<String> {
    vec![
        RefundStep::decl(),
        PassType::decl(),
        RefundDecision::decl(),
        PaymentMethod::decl(),
        ZelleInfo::decl(),
        WiseInfo::decl(),
        PaymentInfo::decl(),
        PassHolder::decl(),
        RefundRequestData::decl(),
        LookupErrorCode::decl(),
        EmailLookupResult::decl(),
        SubmissionResult::decl(),
        RefundStatus::decl(),
        RefundStatusRecord::decl(),
        StatusLookupResult::decl(),
    ]
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("bindings"), PathBuf::from);

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut contents = String::from("// Generated by generate_types. Do not edit.\n");
    for decl in declarations() {
        contents.push('\n');
        contents.push_str("export ");
        contents.push_str(&decl);
        contents.push('\n');
    }

    let path = out_dir.join(OUTPUT_FILE);
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());

    Ok(())
}
