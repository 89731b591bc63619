//! Isolated hook invocation: every call gets a fresh context, and an error or
//! panic turns into a [`HookFailure`] instead of escaping.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{HookFailure, HookKind, HookResult};
use crate::fleet::Entity;
use crate::ledger::StatLedger;
use crate::skills::{LedgerOp, SkillContext};

/// Settled fleet state a hook reads from.
#[derive(Clone, Copy)]
pub(crate) struct FleetView<'a> {
    pub tick: u64,
    pub elapsed: f64,
    pub commander: &'a StatLedger,
    pub entities: &'a BTreeMap<String, Entity>,
}

/// Runs `hook` for `skill` and returns the writes it staged.
pub(crate) fn invoke<F>(
    view: FleetView<'_>,
    skill: &str,
    label: &str,
    kind: HookKind,
    entity: Option<&str>,
    hook: F,
) -> Result<Vec<LedgerOp>, HookFailure>
where
    F: FnOnce(&mut SkillContext<'_>) -> HookResult,
{
    let mut ctx = SkillContext::new(
        skill,
        label,
        view.tick,
        view.elapsed,
        view.commander,
        view.entities,
    );
    let message = match panic::catch_unwind(AssertUnwindSafe(|| hook(&mut ctx))) {
        Ok(Ok(())) => return Ok(ctx.into_ops()),
        Ok(Err(err)) => err.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };
    Err(HookFailure {
        skill: skill.to_string(),
        hook: kind,
        tick: view.tick,
        entity: entity.map(str::to_string),
        message,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
