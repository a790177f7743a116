use serde::Serialize;
use std::fmt;

const RULE_WIDTH: usize = 70;

/// Result of synchronizing one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingOutcome {
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MappingOutcome {
    pub fn succeeded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Per-run tally, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub outcomes: Vec<MappingOutcome>,
}

impl SyncSummary {
    pub fn push(&mut self, outcome: MappingOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    /// 0 only when at least one mapping ran and none failed.
    pub fn exit_code(&self) -> i32 {
        if self.total() > 0 && self.failed() == 0 { 0 } else { 1 }
    }

    pub fn print(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "RESUMEN DE SINCRONIZACIÓN")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "Total proyectos: {}", self.total())?;
        writeln!(f, "✓ Exitosos: {}", self.successful())?;
        writeln!(f, "✗ Fallidos: {}", self.failed())?;
        writeln!(f)?;

        for outcome in &self.outcomes {
            let mark = if outcome.success { "✓" } else { "✗" };
            match &outcome.error {
                Some(error) => writeln!(f, "  {} {} ({})", mark, outcome.name, error)?,
                None => writeln!(f, "  {} {}", mark, outcome.name)?,
            }
        }

        write!(f, "{}", rule)
    }
}
