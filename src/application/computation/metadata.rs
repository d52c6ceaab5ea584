//! Per-node descriptors and temporal context resolution.

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use crate::config::{Config, ConfigResult};
use crate::domain::{ContextArena, ContextId, Datum, DomainResult, Period, ResultSet};

/// How a computation relates to the evaluation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalMode {
    /// Movement over the window (a duration fact).
    InYear,
    /// Balance at the start of the window.
    AtStart,
    /// Balance at the end of the window.
    #[default]
    AtEnd,
}

impl TemporalMode {
    /// Map a configured mode string. Unrecognised strings fall back to `AtEnd`.
    pub fn from_config(value: &str) -> Self {
        match value {
            "in-year" => TemporalMode::InYear,
            "at-start" => TemporalMode::AtStart,
            "at-end" => TemporalMode::AtEnd,
            other => {
                warn!("unknown period mode '{}', using at-end", other);
                TemporalMode::AtEnd
            }
        }
    }
}

/// Immutable descriptor shared by every computation variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub id: String,
    pub description: String,
    /// Base context the temporal dimension is added to
    pub context: ContextId,
    /// Classification segments, empty for unsegmented facts
    pub segments: Vec<(String, String)>,
    pub mode: TemporalMode,
    /// Id of an attached note, if any
    pub note: Option<String>,
}

impl Metadata {
    pub fn new(id: impl Into<String>, context: ContextId, mode: TemporalMode) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            context,
            segments: Vec::new(),
            mode,
            note: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_segments(mut self, segments: Vec<(String, String)>) -> Self {
        self.segments = segments;
        self
    }

    /// Read the common keys of a computation definition.
    ///
    /// A missing `id` gets a generated uuid so anonymous nodes still have a
    /// result slot.
    pub fn load(cfg: &Config, context: ContextId) -> ConfigResult<Self> {
        let id = match cfg.get_opt_string("id")? {
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        let description = cfg.get_string_or("description", "")?;
        let segments = cfg
            .get_map_or_empty("segments")?
            .into_iter()
            .map(|(k, v)| v.as_string().map(|v| (k, v)))
            .collect::<ConfigResult<Vec<_>>>()?;
        let mode = match cfg.get_opt_string("period")? {
            Some(mode) => TemporalMode::from_config(&mode),
            None => TemporalMode::default(),
        };
        let note = cfg.get_opt_string("note")?;
        Ok(Self {
            id,
            description,
            context,
            segments,
            mode,
            note,
        })
    }

    /// Context of this node's fact for the window `[start, end]`.
    pub fn get_context(
        &self,
        contexts: &mut ContextArena,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ContextId {
        let context = match self.mode {
            TemporalMode::AtStart => contexts.with_instant(self.context, start),
            TemporalMode::AtEnd => contexts.with_instant(self.context, end),
            TemporalMode::InYear => {
                contexts.with_period(self.context, &Period::new("", start, end))
            }
        };
        self.segmented(contexts, context)
    }

    /// Like [`Metadata::get_context`] but both instant modes resolve at `start`.
    ///
    /// Used by the single-input transforms (apportion, round, factor,
    /// comparison), whose at-end facts are dated at the window start.
    pub fn get_context_at_start(
        &self,
        contexts: &mut ContextArena,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ContextId {
        let context = match self.mode {
            TemporalMode::AtStart | TemporalMode::AtEnd => {
                contexts.with_instant(self.context, start)
            }
            TemporalMode::InYear => {
                contexts.with_period(self.context, &Period::new("", start, end))
            }
        };
        self.segmented(contexts, context)
    }

    fn segmented(&self, contexts: &mut ContextArena, context: ContextId) -> ContextId {
        if self.segments.is_empty() {
            context
        } else {
            contexts.with_segments(context, &self.segments)
        }
    }

    /// This node's datum in `results`.
    pub fn result<'r>(&self, results: &'r ResultSet) -> DomainResult<&'r Datum> {
        results.get(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("in-year", TemporalMode::InYear)]
    #[case("at-start", TemporalMode::AtStart)]
    #[case("at-end", TemporalMode::AtEnd)]
    #[case("sometime", TemporalMode::AtEnd)]
    #[case("", TemporalMode::AtEnd)]
    fn test_temporal_mode_mapping(#[case] input: &str, #[case] expected: TemporalMode) {
        assert_eq!(TemporalMode::from_config(input), expected);
    }

    #[test]
    fn given_definition_when_load_then_reads_common_keys() {
        let contexts = ContextArena::new();
        let cfg = Config::from_yaml(
            r#"
id: turnover
description: Turnover
period: in-year
note: note-1
segments:
  sector: retail
"#,
        )
        .unwrap();
        let meta = Metadata::load(&cfg, contexts.root()).unwrap();
        assert_eq!(meta.id, "turnover");
        assert_eq!(meta.description, "Turnover");
        assert_eq!(meta.mode, TemporalMode::InYear);
        assert_eq!(meta.note.as_deref(), Some("note-1"));
        assert_eq!(meta.segments, vec![("sector".to_string(), "retail".to_string())]);
    }

    #[test]
    fn given_no_id_when_load_then_generates_unique_ids() {
        let contexts = ContextArena::new();
        let cfg = Config::from_yaml("kind: sum\n").unwrap();
        let a = Metadata::load(&cfg, contexts.root()).unwrap();
        let b = Metadata::load(&cfg, contexts.root()).unwrap();
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.mode, TemporalMode::AtEnd);
    }

    #[test]
    fn given_modes_when_get_context_then_instant_or_period() {
        let mut contexts = ContextArena::new();
        let base = contexts.root();
        let (start, end) = (date(2023, 1, 1), date(2023, 12, 31));

        let at_start = Metadata::new("a", base, TemporalMode::AtStart);
        let at_end = Metadata::new("b", base, TemporalMode::AtEnd);
        let in_year = Metadata::new("c", base, TemporalMode::InYear);

        let ctx = at_start.get_context(&mut contexts, start, end);
        assert_eq!(contexts.instant(ctx), Some(start));
        let ctx = at_end.get_context(&mut contexts, start, end);
        assert_eq!(contexts.instant(ctx), Some(end));
        let ctx = in_year.get_context(&mut contexts, start, end);
        assert_eq!(contexts.period(ctx).map(|p| (p.start, p.end)), Some((start, end)));
    }

    #[test]
    fn given_at_end_when_get_context_at_start_then_dated_at_start() {
        let mut contexts = ContextArena::new();
        let base = contexts.root();
        let (start, end) = (date(2023, 1, 1), date(2023, 12, 31));
        let meta = Metadata::new("x", base, TemporalMode::AtEnd);

        let ctx = meta.get_context_at_start(&mut contexts, start, end);
        assert_eq!(contexts.instant(ctx), Some(start));
    }

    #[test]
    fn given_segments_when_get_context_then_segment_layer_on_top() {
        let mut contexts = ContextArena::new();
        let base = contexts.root();
        let (start, end) = (date(2023, 1, 1), date(2023, 12, 31));
        let meta = Metadata::new("x", base, TemporalMode::AtEnd)
            .with_segments(vec![("sector".into(), "retail".into())]);

        let first = meta.get_context(&mut contexts, start, end);
        let second = meta.get_context(&mut contexts, start, end);
        assert_eq!(first, second);
        assert_eq!(contexts.instant(first), Some(end));
        assert!(contexts.segments(first).is_some());
    }

    #[test]
    fn given_unwritten_result_when_result_then_ordering_error() {
        let contexts = ContextArena::new();
        let meta = Metadata::new("x", contexts.root(), TemporalMode::AtEnd);
        assert_eq!(
            meta.result(&ResultSet::new()).unwrap_err(),
            DomainError::ResultNotComputed("x".into())
        );
    }
}
