//! Terminal rendering of markdown documents such as the page-builder prompt

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::Result;

/// Print markdown to stdout with colors when the terminal supports them
pub fn print_markdown(markdown: &str) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    render_markdown(markdown, &mut stdout)
}

/// Render markdown into any color-capable writer
pub fn render_markdown<W: WriteColor>(markdown: &str, out: &mut W) -> Result<()> {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut state = RenderState::default();

    for event in parser {
        state.handle_event(out, event)?;
    }
    out.reset()?;
    out.flush()?;
    Ok(())
}

/// Formatting state while walking the event stream
#[derive(Default)]
struct RenderState {
    /// Active styles, innermost last
    styles: Vec<ColorSpec>,
    /// Next item number per open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
}

impl RenderState {
    fn handle_event<W: WriteColor>(&mut self, out: &mut W, event: Event) -> Result<()> {
        match event {
            Event::Start(tag) => self.handle_start(out, tag)?,
            Event::End(tag_end) => self.handle_end(out, tag_end)?,
            Event::Text(text) => write!(out, "{}", text)?,
            Event::Code(code) => self.write_inline_code(out, &code)?,
            Event::SoftBreak | Event::HardBreak => writeln!(out)?,
            Event::Rule => writeln!(out, "{}", "─".repeat(40))?,
            _ => {}
        }
        Ok(())
    }

    fn push_style<W: WriteColor>(&mut self, out: &mut W, spec: ColorSpec) -> Result<()> {
        out.set_color(&spec)?;
        self.styles.push(spec);
        Ok(())
    }

    fn pop_style<W: WriteColor>(&mut self, out: &mut W) -> Result<()> {
        self.styles.pop();
        match self.styles.last() {
            Some(spec) => out.set_color(spec)?,
            None => out.reset()?,
        }
        Ok(())
    }

    fn indent(&self) -> String {
        "  ".repeat(self.lists.len().saturating_sub(1))
    }

    fn handle_start<W: WriteColor>(&mut self, out: &mut W, tag: Tag) -> Result<()> {
        match tag {
            Tag::Heading { level, .. } => {
                let color = match level {
                    HeadingLevel::H1 => Color::Rgb(255, 99, 71),
                    HeadingLevel::H2 => Color::Rgb(70, 130, 180),
                    _ => Color::Cyan,
                };
                writeln!(out)?;
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(color)).set_bold(true);
                self.push_style(out, spec)?;
            }
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    writeln!(out)?;
                }
            }
            Tag::Strong => {
                let mut spec = self.styles.last().cloned().unwrap_or_default();
                spec.set_bold(true);
                self.push_style(out, spec)?;
            }
            Tag::Emphasis => {
                let mut spec = self.styles.last().cloned().unwrap_or_default();
                spec.set_italic(true);
                self.push_style(out, spec)?;
            }
            Tag::BlockQuote(_) => {
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(Color::Yellow));
                self.push_style(out, spec)?;
                write!(out, "  │ ")?;
            }
            Tag::CodeBlock(kind) => {
                writeln!(out)?;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        let mut lang_spec = ColorSpec::new();
                        lang_spec.set_fg(Some(Color::Blue)).set_italic(true);
                        out.set_color(&lang_spec)?;
                        writeln!(out, "[{}]", lang)?;
                    }
                }
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(Color::Green));
                self.push_style(out, spec)?;
            }
            Tag::List(start) => {
                if !self.lists.is_empty() {
                    writeln!(out)?;
                }
                self.lists.push(start);
            }
            Tag::Item => {
                let indent = self.indent();
                match self.lists.last_mut() {
                    Some(Some(number)) => {
                        write!(out, "{}{}. ", indent, number)?;
                        *number += 1;
                    }
                    _ => write!(out, "{}• ", indent)?,
                }
            }
            Tag::Link { .. } => {
                let mut spec = ColorSpec::new();
                spec.set_fg(Some(Color::Blue)).set_underline(true);
                self.push_style(out, spec)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end<W: WriteColor>(&mut self, out: &mut W, tag_end: TagEnd) -> Result<()> {
        match tag_end {
            TagEnd::Heading(_) => {
                self.pop_style(out)?;
                writeln!(out)?;
            }
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    writeln!(out)?;
                }
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Link => self.pop_style(out)?,
            TagEnd::BlockQuote(_) | TagEnd::CodeBlock => {
                self.pop_style(out)?;
                writeln!(out)?;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    writeln!(out)?;
                }
            }
            TagEnd::Item => writeln!(out)?,
            _ => {}
        }
        Ok(())
    }

    fn write_inline_code<W: WriteColor>(&self, out: &mut W, code: &str) -> Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "`{}`", code)?;
        match self.styles.last() {
            Some(spec) => out.set_color(spec)?,
            None => out.reset()?,
        }
        Ok(())
    }
}
