use super::answer::select_final_answer;
use super::normalizer::TurnStream;
use crate::application::tooling::ToolCatalog;
use crate::domain::{ContentBlock, Role, Turn};
use crossterm::style::{Color, Stylize, style};
use serde_json::Value;
use std::io::Write;
use tracing::debug;

const SECTION_RULE: &str = "==================================";

/// Prints agent turns as a readable trace. Output errors are swallowed so a
/// broken terminal never aborts a session.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    styled: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, styled: bool) -> Self {
        Self { out, styled }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Renders a top-level raw value, printing it verbatim if its shape is unknown.
    pub fn render_raw(&mut self, raw: &Value) {
        self.render_stream(&TurnStream::from_raw(raw));
    }

    pub fn render_stream(&mut self, stream: &TurnStream) {
        match stream {
            TurnStream::Turns(turns) => self.render(turns),
            TurnStream::Unrecognized(text) => {
                let label = self.paint("Raw Output:", Color::DarkGrey);
                self.line(&format!("{label} {text}"));
                self.flush();
            }
        }
    }

    /// Prints every turn in order. The answer text of the final-answer turn is
    /// held back for the closing section; its other blocks print in place.
    pub fn render(&mut self, turns: &[Turn]) {
        let final_answer = select_final_answer(turns);

        for (index, turn) in turns.iter().enumerate() {
            let held_back = final_answer
                .as_ref()
                .filter(|answer| answer.turn_index == index)
                .map(|answer| answer.from_thoughts);
            match turn.role {
                Role::User => {
                    let label = self.paint("You:", Color::Blue);
                    self.line(&format!("{label} {}", turn.plain_text()));
                }
                Role::ToolResult => self.render_tool_results(turn),
                Role::Assistant => self.render_assistant(turn, held_back),
                Role::Other => debug!("Skipping turn with unknown role"),
            }
        }

        if let Some(answer) = final_answer {
            let title = self.paint("========== Final Answer ==========", Color::Green);
            self.line("");
            self.line(&title);
            self.line(&answer.text);
            self.line(SECTION_RULE);
        }
        self.flush();
    }

    fn render_tool_results(&mut self, turn: &Turn) {
        for block in &turn.content {
            if let ContentBlock::ToolResult {
                tool_name,
                status,
                content,
                ..
            } = block
            {
                let label = self.paint("Tool Response", Color::Yellow);
                self.line(&format!(
                    "{label} [{tool_name}]: {content} (Status: {})",
                    status.as_str()
                ));
            }
        }
    }

    /// `held_back` names the text kind (thought or not) that belongs to the final answer.
    fn render_assistant(&mut self, turn: &Turn, held_back: Option<bool>) {
        for block in &turn.content {
            if let ContentBlock::Text { is_thought, .. } = block
                && held_back == Some(*is_thought)
            {
                continue;
            }
            match block {
                ContentBlock::Text {
                    text,
                    is_thought: true,
                } => {
                    let label = self.paint("Thought:", Color::Magenta);
                    self.line(&format!("{label} {}", text.trim()));
                }
                ContentBlock::Text { text, .. } => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    let label = self.paint("AI Response:", Color::Cyan);
                    self.line(&format!("{label} {}", text.trim()));
                }
                ContentBlock::ToolUse {
                    name, arguments, ..
                } => {
                    let label = self.paint("Tool Planned:", Color::Yellow);
                    self.line(&format!("{label} {name}({})", format_arguments(arguments)));
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }
    }

    pub fn banner(&mut self, catalog: &ToolCatalog) {
        let title = self.paint("Welcome to the agent shell!", Color::Green);
        self.line("");
        self.line(&title);
        if catalog.is_empty() {
            self.line("No tools are available in this session.");
        } else {
            self.line("Available tools:");
            for tool in catalog.iter() {
                let description = tool
                    .description
                    .as_deref()
                    .unwrap_or("No description available.");
                self.line(&format!("  - {}: {}", tool.name, description.trim()));
            }
        }
        self.line("");
        self.line("Type your question or task below. Type 'exit' or 'quit' to leave.");
        self.line("");
        self.flush();
    }

    pub fn prompt(&mut self) {
        let label = self.paint("You:", Color::Blue);
        if let Err(err) = write!(self.out, "{label} ") {
            debug!(%err, "Console write failed");
        }
        self.flush();
    }

    pub fn warning(&mut self, message: &str) {
        let label = self.paint("Warning:", Color::Red);
        self.line(&format!("{label} {message}"));
        self.flush();
    }

    pub fn goodbye(&mut self) {
        let text = self.paint("Goodbye!", Color::Green);
        self.line(&text);
        self.flush();
    }

    pub fn notice(&mut self, message: &str) {
        self.line(message);
        self.flush();
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.styled {
            style(text).with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            debug!(%err, "Console write failed");
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.out.flush() {
            debug!(%err, "Console flush failed");
        }
    }
}

/// `key=value` pairs joined with commas; strings are shown without quotes.
pub fn format_arguments(arguments: &[(String, Value)]) -> String {
    arguments
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ToolStatus;
    use serde_json::json;

    fn render_plain(turns: &[Turn]) -> String {
        let mut renderer = ConsoleRenderer::new(Vec::new(), false);
        renderer.render(turns);
        String::from_utf8(renderer.into_inner()).expect("utf8")
    }

    #[test]
    fn final_answer_turn_is_not_rendered_twice() {
        let output = render_plain(&[
            Turn::user("what is 2+2"),
            Turn::assistant(vec![ContentBlock::text("<result>4</result>")]),
        ]);
        assert!(output.contains("You: what is 2+2"));
        assert!(!output.contains("AI Response"));
        assert!(output.contains("Final Answer"));
        assert_eq!(output.matches("4</result>").count(), 0);
        assert!(output.contains("\n4\n"));
    }

    #[test]
    fn tool_only_turn_prints_plan_without_response_line() {
        let output = render_plain(&[Turn::assistant(vec![ContentBlock::ToolUse {
            id: Some("t1".into()),
            name: "list_files".into(),
            arguments: vec![("extension".into(), json!(".py"))],
        }])]);
        assert_eq!(output.matches("Tool Planned: list_files(extension=.py)").count(), 1);
        assert!(!output.contains("AI Response"));
        assert!(!output.contains("Final Answer"));
    }

    #[test]
    fn intermediate_turns_show_thoughts_and_tool_status() {
        let output = render_plain(&[
            Turn::assistant(vec![
                ContentBlock::thought("check the file"),
                ContentBlock::text("Looking it up."),
                ContentBlock::ToolUse {
                    id: None,
                    name: "read_file".into(),
                    arguments: vec![("filename".into(), json!("notes.md")), ("limit".into(), json!(3))],
                },
            ]),
            Turn::new(
                Role::ToolResult,
                vec![ContentBlock::ToolResult {
                    tool_use_id: None,
                    tool_name: "read_file".into(),
                    status: ToolStatus::Error,
                    content: "Only .txt, .py, and .bal files are allowed.".into(),
                }],
            ),
            Turn::assistant(vec![ContentBlock::text("That file type is not supported.")]),
        ]);

        assert!(output.contains("Thought: check the file"));
        assert!(output.contains("AI Response: Looking it up."));
        assert!(output.contains("Tool Planned: read_file(filename=notes.md, limit=3)"));
        assert!(output.contains(
            "Tool Response [read_file]: Only .txt, .py, and .bal files are allowed. (Status: error)"
        ));
        assert!(output.contains("That file type is not supported."));
        assert!(!output.contains("AI Response: That file type"));
    }

    #[test]
    fn unrecognized_raw_value_is_printed_verbatim() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), false);
        renderer.render_raw(&json!({"unexpected": true}));
        let output = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert_eq!(output, "Raw Output: {\"unexpected\":true}\n");
    }

    #[test]
    fn raw_stream_is_normalized_before_rendering() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), false);
        renderer.render_raw(&json!({"messages": [
            {"type": "human", "content": "hi"},
            {"type": "ai", "content": "The answer is 42"}
        ]}));
        let output = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(output.contains("You: hi"));
        assert!(output.contains("The answer is 42"));
    }

    #[test]
    fn final_answer_turn_still_shows_its_plan_and_thoughts() {
        let output = render_plain(&[
            Turn::assistant(vec![
                ContentBlock::thought("save it first"),
                ContentBlock::text("<result>Saved notes.txt</result>"),
                ContentBlock::ToolUse {
                    id: Some("w1".into()),
                    name: "write_file".into(),
                    arguments: vec![("filename".into(), json!("notes.txt"))],
                },
            ]),
            Turn::assistant(vec![ContentBlock::ToolUse {
                id: Some("r1".into()),
                name: "read_file".into(),
                arguments: vec![("filename".into(), json!("notes.txt"))],
            }]),
        ]);

        assert!(output.contains("Thought: save it first"));
        assert!(output.contains("Tool Planned: write_file(filename=notes.txt)"));
        assert!(output.contains("Tool Planned: read_file(filename=notes.txt)"));
        assert!(!output.contains("AI Response"));
        assert_eq!(output.matches("Saved notes.txt").count(), 1);
    }

    #[test]
    fn thought_only_answer_is_not_repeated_as_a_thought() {
        let output = render_plain(&[Turn::assistant(vec![ContentBlock::thought("just 7")])]);
        assert!(!output.contains("Thought:"));
        assert!(output.contains("Final Answer"));
        assert_eq!(output.matches("just 7").count(), 1);
    }

    #[test]
    fn argument_rendering_keeps_order() {
        let rendered = format_arguments(&[
            ("b".into(), json!(2)),
            ("a".into(), json!("x")),
            ("flag".into(), json!(true)),
        ]);
        assert_eq!(rendered, "b=2, a=x, flag=true");
    }
}
