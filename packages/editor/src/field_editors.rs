//! # Field Editors
//!
//! One edit strategy per [`FieldType`] variant, looked up through an
//! [`EditorTable`]. Strategies never touch the tree: they ask the host for
//! input through a [`Prompt`] and return an [`EditOutcome`]; the workspace
//! turns a change into an undoable edit.

use cfgtree_model::codecs::parse_timestamp;
use cfgtree_model::{FieldCodec, FieldType, NumericRange, Partition, PathAddress, TimeRanges, TIME_FORMAT};
use std::collections::HashMap;
use std::marker::PhantomData;

/// What the host is asked to supply
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    Text,
    Choice(Vec<String>),
    Number { min: f64, max: f64, decimals: u32 },
    Time,
    TimeRange,
    NumericRange,
    Partition,
    /// Answer as `"<tag>\n<description>"`
    PointReference { sources: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub title: String,
    pub current: String,
    pub kind: PromptKind,
}

/// Host-supplied input (dialog, terminal, scripted answers)
pub trait Prompt {
    /// `None` means the user cancelled
    fn ask(&mut self, request: &PromptRequest) -> Option<String>;
}

/// Fixed answers, consumed in order
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Vec<Option<String>>,
    pub asked: Vec<PromptRequest>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut answers: Vec<Option<String>> =
            answers.into_iter().map(|a| a.map(Into::into)).collect();
        answers.reverse();
        Self {
            answers,
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, request: &PromptRequest) -> Option<String> {
        self.asked.push(request.clone());
        self.answers.pop().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Changed(String),
    Unchanged,
    Cancelled,
    /// Input failed validation; value left as is
    Rejected(String),
}

impl EditOutcome {
    fn compare(current: &str, new_value: String) -> Self {
        if new_value == current {
            EditOutcome::Unchanged
        } else {
            EditOutcome::Changed(new_value)
        }
    }
}

pub struct EditContext<'a> {
    pub address: &'a PathAddress,
    pub label: &'a str,
    pub field_type: &'a FieldType,
}

impl EditContext<'_> {
    fn request(&self, current: &str, kind: PromptKind) -> PromptRequest {
        PromptRequest {
            title: self.label.to_string(),
            current: current.to_string(),
            kind,
        }
    }
}

pub trait ValueEditor: Send + Sync {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome;
}

struct FreeTextEditor;

impl ValueEditor for FreeTextEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        match prompt.ask(&ctx.request(current, PromptKind::Text)) {
            Some(answer) => EditOutcome::compare(current, answer),
            None => EditOutcome::Cancelled,
        }
    }
}

struct DropdownEditor;

impl ValueEditor for DropdownEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        let FieldType::Dropdown { options } = ctx.field_type else {
            return EditOutcome::Rejected(format!("{} is not a dropdown", ctx.address));
        };
        let Some(answer) = prompt.ask(&ctx.request(current, PromptKind::Choice(options.clone()))) else {
            return EditOutcome::Cancelled;
        };
        if !options.contains(&answer) {
            return EditOutcome::Rejected(format!("'{}' is not one of the options", answer));
        }
        EditOutcome::compare(current, answer)
    }
}

/// Flips between the two labels without asking
struct CheckboxEditor;

impl ValueEditor for CheckboxEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, _prompt: &mut dyn Prompt) -> EditOutcome {
        match ctx.field_type {
            FieldType::Checkbox { off, on } => {
                let next = if current == on { off } else { on };
                EditOutcome::compare(current, next.clone())
            }
            _ => EditOutcome::Rejected(format!("{} is not a checkbox", ctx.address)),
        }
    }
}

struct SliderEditor;

impl ValueEditor for SliderEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        let FieldType::Slider { min, max, decimals } = *ctx.field_type else {
            return EditOutcome::Rejected(format!("{} is not a slider", ctx.address));
        };
        let kind = PromptKind::Number { min, max, decimals };
        let Some(answer) = prompt.ask(&ctx.request(current, kind)) else {
            return EditOutcome::Cancelled;
        };
        let Ok(number) = answer.trim().parse::<f64>() else {
            return EditOutcome::Rejected(format!("'{}' is not a number", answer));
        };
        let clamped = number.max(min).min(max);
        EditOutcome::compare(current, format!("{:.*}", decimals as usize, clamped))
    }
}

struct TimeEditor;

impl ValueEditor for TimeEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        let Some(answer) = prompt.ask(&ctx.request(current, PromptKind::Time)) else {
            return EditOutcome::Cancelled;
        };
        match parse_timestamp(&answer) {
            Ok(time) => EditOutcome::compare(current, time.format(TIME_FORMAT).to_string()),
            Err(err) => EditOutcome::Rejected(err.to_string()),
        }
    }
}

/// Validates through a typed codec and stores its canonical text
struct CodecEditor<C> {
    kind: PromptKind,
    codec: PhantomData<fn() -> C>,
}

impl<C: FieldCodec> CodecEditor<C> {
    fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            codec: PhantomData,
        }
    }
}

impl<C: FieldCodec> ValueEditor for CodecEditor<C> {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        let Some(answer) = prompt.ask(&ctx.request(current, self.kind.clone())) else {
            return EditOutcome::Cancelled;
        };
        match C::parse(&answer) {
            Ok(parsed) => EditOutcome::compare(current, parsed.to_text()),
            Err(err) => EditOutcome::Rejected(err.to_string()),
        }
    }
}

struct PointReferenceEditor;

impl ValueEditor for PointReferenceEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        let sources = match ctx.field_type {
            FieldType::PointReference { sources } => sources.clone(),
            _ => Vec::new(),
        };
        let Some(answer) = prompt.ask(&ctx.request(current, PromptKind::PointReference { sources })) else {
            return EditOutcome::Cancelled;
        };
        if point_tag(&answer).is_empty() {
            return EditOutcome::Rejected("no point selected".to_string());
        }
        EditOutcome::compare(current, answer.trim_end().to_string())
    }
}

/// Groups and disabled controls are not value-editable
struct ReadOnlyEditor;

impl ValueEditor for ReadOnlyEditor {
    fn open_editor(&self, ctx: &EditContext<'_>, _current: &str, _prompt: &mut dyn Prompt) -> EditOutcome {
        let reason = match ctx.field_type {
            FieldType::Disabled { reason } => reason.clone(),
            other => format!("{} fields are not editable", other),
        };
        EditOutcome::Rejected(reason)
    }
}

/// Tag part of a point reference value (`"<tag>\n<description>"`)
pub fn point_tag(value: &str) -> &str {
    value.lines().next().unwrap_or_default().trim()
}

/// Dispatch table from field type tag to edit strategy
pub struct EditorTable {
    editors: HashMap<&'static str, Box<dyn ValueEditor>>,
    fallback: Box<dyn ValueEditor>,
}

impl EditorTable {
    pub fn standard() -> Self {
        let mut editors: HashMap<&'static str, Box<dyn ValueEditor>> = HashMap::new();
        editors.insert("text", Box::new(FreeTextEditor));
        editors.insert("dropdown", Box::new(DropdownEditor));
        editors.insert("checkbox", Box::new(CheckboxEditor));
        editors.insert("slider", Box::new(SliderEditor));
        editors.insert("time", Box::new(TimeEditor));
        editors.insert(
            "time_range_select",
            Box::new(CodecEditor::<TimeRanges>::new(PromptKind::TimeRange)),
        );
        editors.insert(
            "range",
            Box::new(CodecEditor::<NumericRange>::new(PromptKind::NumericRange)),
        );
        editors.insert(
            "partition",
            Box::new(CodecEditor::<Partition>::new(PromptKind::Partition)),
        );
        editors.insert("fetch", Box::new(PointReferenceEditor));
        editors.insert("group", Box::new(ReadOnlyEditor));
        editors.insert("subgroup", Box::new(ReadOnlyEditor));
        editors.insert("disabled", Box::new(ReadOnlyEditor));
        Self {
            editors,
            fallback: Box::new(FreeTextEditor),
        }
    }

    /// Replace the strategy for one field type
    pub fn register(&mut self, field_type: &FieldType, editor: Box<dyn ValueEditor>) {
        self.editors.insert(field_type.tag(), editor);
    }

    pub fn editor_for(&self, field_type: &FieldType) -> &dyn ValueEditor {
        self.editors
            .get(field_type.tag())
            .map(Box::as_ref)
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn open(&self, ctx: &EditContext<'_>, current: &str, prompt: &mut dyn Prompt) -> EditOutcome {
        self.editor_for(ctx.field_type).open_editor(ctx, current, prompt)
    }
}

impl Default for EditorTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(field_type: FieldType, current: &str, answer: Option<&str>) -> EditOutcome {
        let address = PathAddress::from("x");
        let ctx = EditContext {
            address: &address,
            label: "x",
            field_type: &field_type,
        };
        let mut prompt = ScriptedPrompt::new([answer]);
        EditorTable::standard().open(&ctx, current, &mut prompt)
    }

    #[test]
    fn test_free_text() {
        assert_eq!(run(FieldType::PlainText, "a", Some("b")), EditOutcome::Changed("b".into()));
        assert_eq!(run(FieldType::PlainText, "a", Some("a")), EditOutcome::Unchanged);
        assert_eq!(run(FieldType::PlainText, "a", None), EditOutcome::Cancelled);
    }

    #[test]
    fn test_dropdown_membership() {
        let ty = FieldType::Dropdown { options: vec!["自动".into(), "手动".into()] };
        assert_eq!(run(ty.clone(), "自动", Some("手动")), EditOutcome::Changed("手动".into()));
        assert!(matches!(run(ty, "自动", Some("半自动")), EditOutcome::Rejected(_)));
    }

    #[test]
    fn test_checkbox_toggles_without_prompt() {
        let ty = FieldType::Checkbox { off: "否".into(), on: "是".into() };
        assert_eq!(run(ty.clone(), "否", None), EditOutcome::Changed("是".into()));
        assert_eq!(run(ty, "是", None), EditOutcome::Changed("否".into()));
    }

    #[test]
    fn test_slider_clamps_and_rounds() {
        let ty = FieldType::Slider { min: 0.0, max: 10.0, decimals: 1 };
        assert_eq!(run(ty.clone(), "1.0", Some("3.14159")), EditOutcome::Changed("3.1".into()));
        assert_eq!(run(ty.clone(), "1.0", Some("42")), EditOutcome::Changed("10.0".into()));
        assert!(matches!(run(ty, "1.0", Some("abc")), EditOutcome::Rejected(_)));
    }

    #[test]
    fn test_codec_editors_canonicalise() {
        assert_eq!(
            run(FieldType::NumericRange, "", Some("1~ 2")),
            EditOutcome::Changed("1 ~ 2".into())
        );
        assert!(matches!(
            run(FieldType::Partition, "", Some("0 ~ 1\n2 ~ 3")),
            EditOutcome::Rejected(_)
        ));
        assert_eq!(
            run(FieldType::TimeRange, "", Some("2024-01-01 00:00:00 ~ 2024-01-01 01:00:00")),
            EditOutcome::Changed("2024-01-01 00:00:00~2024-01-01 01:00:00".into())
        );
        assert!(matches!(run(FieldType::Time, "", Some("yesterday")), EditOutcome::Rejected(_)));
    }

    #[test]
    fn test_point_reference() {
        let ty = FieldType::PointReference { sources: vec!["point-search".into()] };
        assert_eq!(
            run(ty.clone(), "", Some("P-101\n1号泵出口压力")),
            EditOutcome::Changed("P-101\n1号泵出口压力".into())
        );
        assert!(matches!(run(ty, "", Some("\n")), EditOutcome::Rejected(_)));
        assert_eq!(point_tag("P-101\n1号泵出口压力"), "P-101");
    }

    #[test]
    fn test_groups_are_read_only() {
        assert!(matches!(run(FieldType::Group, "", Some("x")), EditOutcome::Rejected(_)));
        let disabled = FieldType::Disabled { reason: "dropdown declares no options".into() };
        assert_eq!(
            run(disabled, "", Some("x")),
            EditOutcome::Rejected("dropdown declares no options".into())
        );
    }
}
