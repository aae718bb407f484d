//! A small XPath evaluator over scraper's HTML tree
//!
//! Supported grammar:
//!
//! - absolute location paths built from `/` (child) and `//`
//!   (descendant-or-self) steps
//! - element name tests and `*`
//! - terminal `text()` and `@attr` steps
//! - predicates: `[n]`, `[last()]`, `[@attr]`, `[@attr='v']`,
//!   `[text()='v']`, `[contains(@attr,'v')]`, `[contains(text(),'v')]`
//!
//! Element results evaluate to their trimmed inner text.

use scraper::{ElementRef, Html};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    AnyElement,
    Text,
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Attribute(String),
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    Last,
    Exists(Operand),
    Equals(Operand, String),
    Contains(Operand, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// A compiled XPath expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathExpr {
    steps: Vec<Step>,
}

impl XPathExpr {
    /// Parses an expression, returning a human-readable reason on failure
    pub fn parse(expr: &str) -> Result<Self, String> {
        let mut parser = Parser::new(expr);
        let steps = parser.location_path()?;

        let last = steps.len() - 1;
        for (i, step) in steps.iter().enumerate() {
            let terminal = matches!(step.test, NodeTest::Text | NodeTest::Attribute(_));
            if terminal && i != last {
                return Err("text() and attribute steps must come last".to_string());
            }
            if terminal && !step.predicates.is_empty() {
                return Err("predicates are only supported on element steps".to_string());
            }
        }

        Ok(Self { steps })
    }

    /// Evaluates the expression against `document`
    pub fn evaluate(&self, document: &Html) -> Vec<String> {
        let mut contexts = vec![Context::Document];

        for step in &self.steps {
            let bases = match step.axis {
                Axis::Child => contexts,
                Axis::Descendant => descendants_or_self(document, &contexts),
            };

            match &step.test {
                NodeTest::Text => return text_children(&bases),
                NodeTest::Attribute(name) => return attribute_values(&bases, name),
                test => {
                    contexts = bases
                        .iter()
                        .flat_map(|base| select_children(document, *base, test, &step.predicates))
                        .map(Context::Element)
                        .collect();
                }
            }
        }

        contexts
            .into_iter()
            .filter_map(|context| match context {
                Context::Element(el) => Some(inner_text(el)),
                Context::Document => None,
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Context<'a> {
    Document,
    Element(ElementRef<'a>),
}

fn child_elements<'a>(document: &'a Html, context: Context<'a>) -> Vec<ElementRef<'a>> {
    match context {
        Context::Document => vec![document.root_element()],
        Context::Element(el) => el.children().filter_map(ElementRef::wrap).collect(),
    }
}

fn descendants_or_self<'a>(document: &'a Html, contexts: &[Context<'a>]) -> Vec<Context<'a>> {
    let mut seen = HashSet::new();
    let mut include_document = false;
    let mut result = Vec::new();

    for context in contexts {
        let elements: Vec<ElementRef<'a>> = match context {
            Context::Document => {
                include_document = true;
                document
                    .root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .collect()
            }
            Context::Element(el) => el.descendants().filter_map(ElementRef::wrap).collect(),
        };

        for el in elements {
            if seen.insert(el.id()) {
                result.push(Context::Element(el));
            }
        }
    }

    if include_document {
        result.insert(0, Context::Document);
    }
    result
}

fn select_children<'a>(
    document: &'a Html,
    context: Context<'a>,
    test: &NodeTest,
    predicates: &[Predicate],
) -> Vec<ElementRef<'a>> {
    let mut candidates: Vec<ElementRef<'a>> = child_elements(document, context)
        .into_iter()
        .filter(|el| match test {
            NodeTest::Name(name) => el.value().name().eq_ignore_ascii_case(name),
            NodeTest::AnyElement => true,
            _ => false,
        })
        .collect();

    for predicate in predicates {
        let size = candidates.len();
        candidates = candidates
            .into_iter()
            .enumerate()
            .filter(|(i, el)| predicate.matches(*el, i + 1, size))
            .map(|(_, el)| el)
            .collect();
    }

    candidates
}

fn text_children(contexts: &[Context<'_>]) -> Vec<String> {
    contexts
        .iter()
        .filter_map(|context| match context {
            Context::Element(el) => Some(*el),
            Context::Document => None,
        })
        .flat_map(|el| {
            el.children()
                .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|text| !text.is_empty())
        .collect()
}

fn attribute_values(contexts: &[Context<'_>], name: &str) -> Vec<String> {
    contexts
        .iter()
        .filter_map(|context| match context {
            Context::Element(el) => el.value().attr(name).map(str::to_string),
            Context::Document => None,
        })
        .collect()
}

fn inner_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

impl Predicate {
    fn matches(&self, el: ElementRef<'_>, position: usize, size: usize) -> bool {
        match self {
            Predicate::Position(n) => position == *n,
            Predicate::Last => position == size,
            Predicate::Exists(operand) => operand.value(el).is_some(),
            Predicate::Equals(operand, expected) => {
                operand.value(el).is_some_and(|v| v == *expected)
            }
            Predicate::Contains(operand, needle) => {
                operand.value(el).is_some_and(|v| v.contains(needle.as_str()))
            }
        }
    }
}

impl Operand {
    fn value(&self, el: ElementRef<'_>) -> Option<String> {
        match self {
            Operand::Attribute(name) => el.value().attr(name).map(str::to_string),
            Operand::Text => Some(inner_text(el)),
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.trim().chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        let token: Vec<char> = token.chars().collect();
        let end = self.pos + token.len();
        if end <= self.chars.len() && self.chars[self.pos..end] == token[..] {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), String> {
        self.skip_whitespace();
        if self.eat(token) {
            Ok(())
        } else {
            Err(format!("expected '{}' at position {}", token, self.pos))
        }
    }

    fn location_path(&mut self) -> Result<Vec<Step>, String> {
        if self.at_end() {
            return Err("empty expression".to_string());
        }

        let mut steps = Vec::new();
        while !self.at_end() {
            let axis = if self.eat("//") {
                Axis::Descendant
            } else if self.eat("/") {
                Axis::Child
            } else if steps.is_empty() {
                return Err("expression must start with '/' or '//'".to_string());
            } else {
                return Err(format!("unexpected character at position {}", self.pos));
            };
            steps.push(self.step(axis)?);
        }
        Ok(steps)
    }

    fn step(&mut self, axis: Axis) -> Result<Step, String> {
        let test = if self.eat("@") {
            NodeTest::Attribute(self.name()?)
        } else if self.eat("text()") {
            NodeTest::Text
        } else if self.eat("*") {
            NodeTest::AnyElement
        } else {
            NodeTest::Name(self.name()?.to_ascii_lowercase())
        };

        let mut predicates = Vec::new();
        while self.eat("[") {
            predicates.push(self.predicate()?);
            self.expect("]")?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn name(&mut self) -> Result<String, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(format!("expected a name at position {}", self.pos));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn predicate(&mut self) -> Result<Predicate, String> {
        self.skip_whitespace();

        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            let position: usize = digits
                .parse()
                .map_err(|_| format!("invalid position '{}'", digits))?;
            if position == 0 {
                return Err("positions start at 1".to_string());
            }
            return Ok(Predicate::Position(position));
        }

        if self.eat("last()") {
            return Ok(Predicate::Last);
        }

        if self.eat("contains(") {
            self.skip_whitespace();
            let operand = self.operand()?;
            self.expect(",")?;
            let needle = self.literal()?;
            self.expect(")")?;
            return Ok(Predicate::Contains(operand, needle));
        }

        let operand = self.operand()?;
        self.skip_whitespace();
        if self.eat("=") {
            let expected = self.literal()?;
            Ok(Predicate::Equals(operand, expected))
        } else {
            Ok(Predicate::Exists(operand))
        }
    }

    fn operand(&mut self) -> Result<Operand, String> {
        if self.eat("@") {
            Ok(Operand::Attribute(self.name()?))
        } else if self.eat("text()") {
            Ok(Operand::Text)
        } else {
            Err(format!("unsupported predicate at position {}", self.pos))
        }
    }

    fn literal(&mut self) -> Result<String, String> {
        self.skip_whitespace();
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(format!("expected a quoted string at position {}", self.pos)),
        };
        self.pos += 1;

        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.at_end() {
            return Err("unterminated string literal".to_string());
        }
        let value = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(value)
    }
}
