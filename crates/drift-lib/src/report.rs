//! Difference report produced by the comparator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource category a difference belongs to, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Pods,
    Deployments,
    Autoscalers,
    Services,
    #[serde(rename = "configmaps")]
    ConfigMaps,
    Ingress,
    CredentialSecret,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Pods,
        Category::Deployments,
        Category::Autoscalers,
        Category::Services,
        Category::ConfigMaps,
        Category::Ingress,
        Category::CredentialSecret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pods => "pods",
            Category::Deployments => "deployments",
            Category::Autoscalers => "autoscalers",
            Category::Services => "services",
            Category::ConfigMaps => "configmaps",
            Category::Ingress => "ingress",
            Category::CredentialSecret => "credentialSecret",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the two sides disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffKind {
    /// Collections of different length; values are the two lengths
    CountMismatch,
    /// Same slot, different value
    Changed,
    /// Present only on the second snapshot
    Added,
    /// Present only on the first snapshot
    Removed,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiffKind::CountMismatch => "count",
            DiffKind::Changed => "changed",
            DiffKind::Added => "added",
            DiffKind::Removed => "removed",
        })
    }
}

/// One side of a difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffValue {
    Int(i64),
    Flag(bool),
    Text(String),
    Absent,
}

impl fmt::Display for DiffValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffValue::Int(n) => write!(f, "{}", n),
            DiffValue::Flag(b) => write!(f, "{}", b),
            DiffValue::Text(s) => write!(f, "{:?}", s),
            DiffValue::Absent => f.write_str("<absent>"),
        }
    }
}

impl From<i32> for DiffValue {
    fn from(n: i32) -> Self {
        DiffValue::Int(n.into())
    }
}

impl From<usize> for DiffValue {
    fn from(n: usize) -> Self {
        DiffValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<bool> for DiffValue {
    fn from(b: bool) -> Self {
        DiffValue::Flag(b)
    }
}

impl From<&str> for DiffValue {
    fn from(s: &str) -> Self {
        DiffValue::Text(s.to_string())
    }
}

impl From<String> for DiffValue {
    fn from(s: String) -> Self {
        DiffValue::Text(s)
    }
}

/// A single field-level or membership difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difference {
    pub category: Category,
    pub path: String,
    pub kind: DiffKind,
    /// Value on the first snapshot
    pub expected: DiffValue,
    /// Value on the second snapshot
    pub actual: DiffValue,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiffKind::CountMismatch => {
                write!(
                    f,
                    "[{}] {}: count {} -> {}",
                    self.category, self.path, self.expected, self.actual
                )?;
                if let (DiffValue::Int(a), DiffValue::Int(b)) = (&self.expected, &self.actual) {
                    let side = if a > b { "second" } else { "first" };
                    write!(f, " ({} missing on {})", (a - b).abs(), side)?;
                }
                Ok(())
            }
            DiffKind::Changed => write!(
                f,
                "[{}] {}: {} -> {}",
                self.category, self.path, self.expected, self.actual
            ),
            DiffKind::Added => write!(f, "[{}] {}: added {}", self.category, self.path, self.actual),
            DiffKind::Removed => write!(
                f,
                "[{}] {}: removed {}",
                self.category, self.path, self.expected
            ),
        }
    }
}

/// Complete outcome of comparing two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// True iff `differences` is empty
    pub identical: bool,
    pub differences: Vec<Difference>,
}

impl DiffReport {
    pub fn new(differences: Vec<Difference>) -> Self {
        Self {
            identical: differences.is_empty(),
            differences,
        }
    }

    /// Process exit status for this outcome: 0 when identical, 1 on drift
    pub fn exit_code(&self) -> u8 {
        if self.identical {
            0
        } else {
            1
        }
    }

    /// Number of differences per category, in report order, skipping empty ones
    pub fn summary(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|c| {
                let n = self.differences.iter().filter(|d| d.category == *c).count();
                (*c, n)
            })
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Deterministic plain-text rendering
    pub fn render_text(&self) -> String {
        if self.identical {
            return "OK".to_string();
        }

        let mut out = format!("NOT OK: {} difference(s)\n", self.differences.len());
        for d in &self.differences {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out
    }
}
