use std::fmt::Write;

use super::process_control_block::ProcessControlBlock;
use super::{KernelError, Scheduler};

const HEADER: &str = "... Name                            | Class       | State   | Suspended | Priority | Stack\n\
                      ...---------------------------------|-------------|---------|-----------|----------|---------------";

fn format_row(out: &mut String, pcb: &ProcessControlBlock) {
    let suspended = if pcb.suspended { "yes" } else { "no" };
    let _ = writeln!(
        out,
        "... {:<31} | {:<11} | {:<7} | {:<9} | {:<8} | {:#06x}..{:#06x}",
        pcb.get_name(),
        pcb.get_class().to_string(),
        pcb.state.to_string(),
        suspended,
        pcb.get_priority().get(),
        pcb.get_stack_bottom(),
        pcb.get_stack_top()
    );
}

fn format_section<'a>(
    out: &mut String,
    title: &str,
    count: usize,
    pcbs: impl Iterator<Item = &'a ProcessControlBlock>,
) {
    let _ = writeln!(out, "{} ({}):", title, count);
    let _ = writeln!(out, "{}", HEADER);

    let mut empty = true;
    for pcb in pcbs {
        format_row(out, pcb);
        empty = false;
    }

    if empty {
        let _ = writeln!(out, "... (empty)");
    }
}

pub fn show(scheduler: &Scheduler, name: &str) -> Result<String, KernelError> {
    let pcb = scheduler
        .find(name)
        .ok_or_else(|| KernelError::NotFound(name.to_string()))?;

    let mut out = String::new();
    let _ = writeln!(out, "{}", HEADER);
    format_row(&mut out, pcb);

    Ok(out)
}

pub fn show_ready(scheduler: &Scheduler) -> String {
    let mut out = String::new();
    format_section(&mut out, "Ready queue", scheduler.ready_count(), scheduler.ready());
    out
}

pub fn show_blocked(scheduler: &Scheduler) -> String {
    let mut out = String::new();
    format_section(&mut out, "Blocked queue", scheduler.blocked_count(), scheduler.blocked());
    out
}

pub fn show_all(scheduler: &Scheduler) -> String {
    let mut out = show_ready(scheduler);
    out.push_str(&show_blocked(scheduler));
    let _ = writeln!(
        out,
        "Stack memory: {} of {} bytes in use",
        scheduler.stack_bytes_in_use(),
        scheduler.stack_region_size()
    );
    out
}
