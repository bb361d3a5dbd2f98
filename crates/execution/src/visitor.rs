//! Operator-tree introspection via visitor dispatch.

use driftq_common::Result;

use crate::operator::Operator;
use crate::send_delete::SendDelete;
use crate::send_upsert::SendUpsert;
use crate::sequence::Sequence;

/// One method per operator variant; `Operator::accept` dispatches here.
pub trait Visitor {
    /// Visit a [`Sequence`] composition.
    fn visit_sequence(&mut self, op: &Sequence) -> Result<()>;
    /// Visit a [`SendUpsert`] consumer.
    fn visit_send_upsert(&mut self, op: &SendUpsert) -> Result<()>;
    /// Visit a [`SendDelete`] consumer.
    fn visit_send_delete(&mut self, op: &SendDelete) -> Result<()>;
}

/// Render an operator tree as human-readable multiline text.
pub fn explain(op: &dyn Operator) -> Result<String> {
    let mut formatter = PlanFormatter::new();
    op.accept(&mut formatter)?;
    Ok(formatter.finish())
}

/// Visitor rendering the operator tree as indented text.
pub struct PlanFormatter {
    indent: usize,
    out: String,
}

impl PlanFormatter {
    /// Empty formatter at indent level zero.
    pub fn new() -> Self {
        Self {
            indent: 0,
            out: String::new(),
        }
    }

    /// The rendered text.
    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        let pad = "  ".repeat(self.indent);
        self.out.push_str(&format!("{pad}{text}\n"));
    }
}

impl Default for PlanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for PlanFormatter {
    fn visit_sequence(&mut self, op: &Sequence) -> Result<()> {
        self.line("Sequence");
        self.indent += 1;
        for child in op.children() {
            child.accept(self)?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn visit_send_upsert(&mut self, op: &SendUpsert) -> Result<()> {
        let key = match op.plan().key() {
            Some(expr) => expr.describe(),
            None => "<store-assigned>".to_string(),
        };
        self.line(&format!(
            "SendUpsert keyspace={} key={key}",
            op.plan().keyspace().name()
        ));
        Ok(())
    }

    fn visit_send_delete(&mut self, op: &SendDelete) -> Result<()> {
        self.line(&format!(
            "SendDelete keyspace={} key={}",
            op.plan().keyspace().name(),
            op.plan().key().describe()
        ));
        Ok(())
    }
}
