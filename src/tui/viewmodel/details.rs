//! Resource and policy details overlay.

use crate::error::ClientErrorKind;
use crate::model::wire::{pretty_rule, PolicyDetails, ResourceDetails};
use crate::model::ResourceType;

/// What the overlay is about. Completions for another subject are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsSubject {
    Resource {
        resource_type: ResourceType,
        id: String,
    },
    Policy {
        name: String,
    },
}

impl DetailsSubject {
    pub fn title(&self) -> String {
        match self {
            Self::Resource { resource_type, id } => format!("{resource_type} {id}"),
            Self::Policy { name } => format!("policy {name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Loading,
    Resource(ResourceDetails),
    Policy(PolicyDetails),
    Failed(ClientErrorKind),
}

/// Overlay state: subject, fetched content and scroll position.
///
/// For policies, `choices` holds every policy named by the selected cell's
/// analysis so the overlay can cycle through them.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsPanel {
    subject: DetailsSubject,
    content: Content,
    pub scroll: u16,
    choices: Vec<String>,
    choice: usize,
}

impl DetailsPanel {
    pub fn resource(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            subject: DetailsSubject::Resource {
                resource_type,
                id: id.into(),
            },
            content: Content::Loading,
            scroll: 0,
            choices: Vec::new(),
            choice: 0,
        }
    }

    /// Panel for the first of `names`; `None` when there are no policies.
    pub fn policies(names: Vec<String>) -> Option<Self> {
        let first = names.first()?.clone();
        Some(Self {
            subject: DetailsSubject::Policy { name: first },
            content: Content::Loading,
            scroll: 0,
            choices: names,
            choice: 0,
        })
    }

    pub fn subject(&self) -> &DetailsSubject {
        &self.subject
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.content, Content::Loading)
    }

    /// `(n, total)` when cycling through several policies.
    pub fn position(&self) -> Option<(usize, usize)> {
        (self.choices.len() > 1).then(|| (self.choice + 1, self.choices.len()))
    }

    /// Move to the next policy. Returns its name when the subject changed.
    pub fn next_policy(&mut self) -> Option<String> {
        if self.choices.len() < 2 {
            return None;
        }
        self.choice = (self.choice + 1) % self.choices.len();
        let name = self.choices[self.choice].clone();
        self.subject = DetailsSubject::Policy { name: name.clone() };
        self.content = Content::Loading;
        self.scroll = 0;
        Some(name)
    }

    /// Apply a fetched resource. Ignored unless it is the current subject.
    pub fn resource_loaded(&mut self, id: &str, outcome: Result<ResourceDetails, ClientErrorKind>) -> bool {
        let matches = matches!(&self.subject, DetailsSubject::Resource { id: current, .. } if current == id);
        if matches {
            self.content = match outcome {
                Ok(details) => Content::Resource(details),
                Err(kind) => Content::Failed(kind),
            };
        }
        matches
    }

    /// Apply a fetched policy. Ignored unless it is the current subject.
    pub fn policy_loaded(&mut self, name: &str, outcome: Result<PolicyDetails, ClientErrorKind>) -> bool {
        let matches = matches!(&self.subject, DetailsSubject::Policy { name: current } if current == name);
        if matches {
            self.content = match outcome {
                Ok(details) => Content::Policy(details),
                Err(kind) => Content::Failed(kind),
            };
        }
        matches
    }

    /// Display lines: `(Some(label), value)` pairs, or `(None, text)` for
    /// free text such as rule bodies.
    pub fn lines(&self) -> Vec<(Option<String>, String)> {
        match &self.content {
            Content::Loading => vec![(None, "Loading...".to_string())],
            Content::Failed(kind) => vec![(Some("Error".to_string()), kind.to_string())],
            Content::Resource(details) => details
                .summary_lines()
                .into_iter()
                .map(|(k, v)| (Some(k), v))
                .collect(),
            Content::Policy(policy) => policy_lines(policy),
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.scroll).saturating_add(delta).max(0);
        self.scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }
}

fn policy_lines(policy: &PolicyDetails) -> Vec<(Option<String>, String)> {
    let mut lines = vec![
        (Some("Name".to_string()), policy.name.clone()),
        (Some("Namespace".to_string()), policy.namespace.clone()),
    ];
    for (title, rules) in policy.rule_sections() {
        lines.push((Some(title.to_string()), rules.len().to_string()));
        for rule in rules {
            lines.extend(pretty_rule(rule).into_iter().map(|l| (None, format!("  {l}"))));
        }
    }
    lines
}
