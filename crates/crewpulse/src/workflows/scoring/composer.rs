use super::domain::SignalKind;

/// The per-employee collector outputs, one optional slot per signal. `None`
/// means the signal was not applicable and stays neutral; it is never
/// imputed as a zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentScores {
    pub attendance: Option<f64>,
    pub punctuality: Option<f64>,
    pub tasks: Option<f64>,
    pub tests: Option<f64>,
    pub reviews: Option<f64>,
}

impl ComponentScores {
    pub fn get(&self, kind: SignalKind) -> Option<f64> {
        match kind {
            SignalKind::Attendance => self.attendance,
            SignalKind::Punctuality => self.punctuality,
            SignalKind::Tasks => self.tasks,
            SignalKind::Tests => self.tests,
            SignalKind::Reviews => self.reviews,
        }
    }

    /// The applicable components in canonical signal order.
    pub fn applicable(&self) -> Vec<(SignalKind, f64)> {
        SignalKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).map(|score| (*kind, score)))
            .collect()
    }
}

/// Composite result for one employee before ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub effective: Option<f64>,
    pub used_components: u32,
}

/// Average the applicable components, subtract the warning penalty, clamp to
/// [0, 100]. No applicable components yields no score at all.
pub fn compose(components: &ComponentScores, penalty: f64) -> ScoreBreakdown {
    let applicable = components.applicable();
    if applicable.is_empty() {
        return ScoreBreakdown {
            effective: None,
            used_components: 0,
        };
    }

    let mean = applicable.iter().map(|(_, score)| score).sum::<f64>() / applicable.len() as f64;
    ScoreBreakdown {
        effective: Some((mean - penalty).clamp(0.0, 100.0)),
        used_components: applicable.len() as u32,
    }
}
