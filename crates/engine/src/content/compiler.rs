use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::world::{
    Cell, InteriorId, MapRef, NpcDef, NpcKind, NpcTopic, RiddleDef, RiddleId, RiddleOption,
    StageDef, StageTable, Suspect,
};

use super::database::CaseDatabase;

/// Every riddle offers exactly four answers, picked with 1-4 or a-d.
pub const RIDDLE_OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownElement,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateId,
    DanglingReference,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

pub fn compile_case_file(path: &Path) -> Result<CaseDatabase, ContentCompileError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read case file: {source}"),
        file_path: path.to_path_buf(),
        location: None,
    })?;
    compile_case_document(path, &raw)
}

pub fn compile_case_document(
    file_path: &Path,
    raw: &str,
) -> Result<CaseDatabase, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let ctx = Ctx {
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Case" {
        return Err(ctx.error(
            ContentErrorCode::InvalidRoot,
            "root element must be <Case>".to_string(),
            root,
        ));
    }
    let title = root.attribute("title").unwrap_or_default().to_string();

    let mut riddles = Vec::<RiddleDef>::new();
    let mut npcs = Vec::<NpcDef>::new();
    let mut stages = Vec::<(StageDef, SourceLocation)>::new();
    let mut suspects = Vec::<Suspect>::new();
    let mut seen_riddles = HashSet::<RiddleId>::new();
    let mut seen_npcs = HashSet::<String>::new();
    let mut seen_stages = HashSet::<u32>::new();
    let mut seen_suspects = HashSet::<String>::new();

    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "Riddle" => {
                let riddle = parse_riddle(&ctx, child)?;
                if !seen_riddles.insert(riddle.id) {
                    return Err(ctx.duplicate("Riddle", &riddle.id.to_string(), child));
                }
                riddles.push(riddle);
            }
            "Npc" => {
                let npc = parse_npc(&ctx, child)?;
                if !seen_npcs.insert(npc.id.clone()) {
                    return Err(ctx.duplicate("Npc", &npc.id, child));
                }
                if npc.drives_case && npcs.iter().any(|other| other.drives_case) {
                    return Err(ctx.error(
                        ContentErrorCode::InvalidValue,
                        format!(
                            "<Npc> '{}' sets drivesCase but another NPC already does",
                            npc.id
                        ),
                        child,
                    ));
                }
                npcs.push(npc);
            }
            "Stage" => {
                let stage = parse_stage(&ctx, child)?;
                if !seen_stages.insert(stage.stage) {
                    return Err(ctx.duplicate("Stage", &stage.stage.to_string(), child));
                }
                stages.push((stage, ctx.location(child)));
            }
            "Suspect" => {
                let suspect = parse_suspect(&ctx, child)?;
                if !seen_suspects.insert(suspect.id.clone()) {
                    return Err(ctx.duplicate("Suspect", &suspect.id, child));
                }
                suspects.push(suspect);
            }
            other => {
                return Err(ctx.error(
                    ContentErrorCode::UnknownElement,
                    format!(
                        "unsupported element <{other}>; expected <Riddle>, <Npc>, <Stage> or <Suspect>"
                    ),
                    child,
                ))
            }
        }
    }

    for (stage, location) in &stages {
        if stage.stage as usize >= stages.len() {
            return Err(ctx.error_at(
                ContentErrorCode::InvalidValue,
                format!(
                    "stage index {} leaves a gap; stages must be numbered 0..{}",
                    stage.stage,
                    stages.len()
                ),
                *location,
            ));
        }
        for referenced in [stage.required_riddle, stage.enables].into_iter().flatten() {
            if !seen_riddles.contains(&referenced) {
                return Err(ctx.error_at(
                    ContentErrorCode::DanglingReference,
                    format!(
                        "stage {} references riddle {} which is not defined",
                        stage.stage, referenced
                    ),
                    *location,
                ));
            }
        }
    }

    let culprit = root.attribute("culprit").map(str::to_string);
    if let Some(culprit) = &culprit {
        if !seen_suspects.contains(culprit) {
            return Err(ctx.error(
                ContentErrorCode::DanglingReference,
                format!("culprit '{culprit}' is not a declared <Suspect>"),
                root,
            ));
        }
    }

    Ok(CaseDatabase::from_parts(
        title,
        riddles,
        npcs,
        StageTable::new(stages.into_iter().map(|(stage, _)| stage).collect()),
        suspects,
        culprit,
    ))
}

fn parse_riddle(ctx: &Ctx<'_, '_>, node: Node<'_, '_>) -> Result<RiddleDef, ContentCompileError> {
    let id = RiddleId(ctx.parsed_attr::<u32>(node, "id")?);
    let map = parse_map_ref(ctx.required_attr(node, "map")?);
    let cell = Cell::new(ctx.parsed_attr(node, "x")?, ctx.parsed_attr(node, "y")?);

    let mut fields = FieldSet::new("Riddle");
    let mut location = None;
    let mut question = None;
    let mut clue = None;
    let mut options = Vec::<(RiddleOption, bool)>::new();

    for field in node.children().filter(|child| child.is_element()) {
        match field.tag_name().name() {
            "location" => {
                fields.once(ctx, field)?;
                location = Some(ctx.required_text(field)?);
            }
            "question" => {
                fields.once(ctx, field)?;
                question = Some(ctx.required_text(field)?);
            }
            "clue" => {
                fields.once(ctx, field)?;
                clue = Some(ctx.required_text(field)?);
            }
            "option" => {
                let label = ctx.required_attr(field, "label")?.to_string();
                let correct = ctx.optional_bool_attr(field, "correct")?.unwrap_or(false);
                let text = ctx.required_text(field)?;
                options.push((RiddleOption { label, text }, correct));
            }
            other => return Err(fields.unknown(ctx, other, field)),
        }
    }

    if options.len() != RIDDLE_OPTION_COUNT {
        return Err(ctx.error(
            ContentErrorCode::InvalidValue,
            format!(
                "riddle {id} has {} options; exactly {RIDDLE_OPTION_COUNT} are required",
                options.len()
            ),
            node,
        ));
    }
    let correct = options
        .iter()
        .enumerate()
        .filter(|(_, (_, correct))| *correct)
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    let [correct_index] = correct.as_slice() else {
        return Err(ctx.error(
            ContentErrorCode::InvalidValue,
            format!(
                "riddle {id} marks {} options correct; exactly one is required",
                correct.len()
            ),
            node,
        ));
    };

    Ok(RiddleDef {
        id,
        location: fields.required(ctx, node, "location", location)?,
        question: fields.required(ctx, node, "question", question)?,
        options: options.into_iter().map(|(option, _)| option).collect(),
        correct_index: *correct_index,
        clue_text: fields.required(ctx, node, "clue", clue)?,
        map,
        cell,
    })
}

fn parse_npc(ctx: &Ctx<'_, '_>, node: Node<'_, '_>) -> Result<NpcDef, ContentCompileError> {
    let id = ctx.required_attr(node, "id")?.to_string();
    let kind_raw = ctx.required_attr(node, "kind")?;
    let Some(kind) = NpcKind::parse(kind_raw) else {
        return Err(ctx.error(
            ContentErrorCode::InvalidValue,
            format!("invalid kind '{kind_raw}'; allowed values: witness, suspect, civilian"),
            node,
        ));
    };
    let cell = Cell::new(ctx.parsed_attr(node, "x")?, ctx.parsed_attr(node, "y")?);
    let suspicion = ctx.optional_suspicion_attr(node)?;
    let drives_case = ctx.optional_bool_attr(node, "drivesCase")?.unwrap_or(false);

    let mut fields = FieldSet::new("Npc");
    let mut name = None;
    let mut greeting = None;
    let mut clue = None;
    let mut topics = Vec::<NpcTopic>::new();

    for field in node.children().filter(|child| child.is_element()) {
        match field.tag_name().name() {
            "name" => {
                fields.once(ctx, field)?;
                name = Some(ctx.required_text(field)?);
            }
            "greeting" => {
                fields.once(ctx, field)?;
                greeting = Some(ctx.required_text(field)?);
            }
            "clue" => {
                fields.once(ctx, field)?;
                clue = Some(ctx.required_text(field)?);
            }
            "topic" => topics.push(parse_topic(ctx, field)?),
            other => return Err(fields.unknown(ctx, other, field)),
        }
    }

    Ok(NpcDef {
        id,
        name: fields.required(ctx, node, "name", name)?,
        kind,
        cell,
        greeting: fields.required(ctx, node, "greeting", greeting)?,
        topics,
        clue: clue.unwrap_or_default(),
        suspicion,
        drives_case,
    })
}

fn parse_topic(ctx: &Ctx<'_, '_>, node: Node<'_, '_>) -> Result<NpcTopic, ContentCompileError> {
    let mut fields = FieldSet::new("topic");
    let mut question = None;
    let mut response = None;

    for field in node.children().filter(|child| child.is_element()) {
        match field.tag_name().name() {
            "question" => {
                fields.once(ctx, field)?;
                question = Some(ctx.required_text(field)?);
            }
            "response" => {
                fields.once(ctx, field)?;
                response = Some(ctx.required_text(field)?);
            }
            other => return Err(fields.unknown(ctx, other, field)),
        }
    }

    Ok(NpcTopic {
        question: fields.required(ctx, node, "question", question)?,
        response: fields.required(ctx, node, "response", response)?,
    })
}

fn parse_stage(ctx: &Ctx<'_, '_>, node: Node<'_, '_>) -> Result<StageDef, ContentCompileError> {
    let stage = ctx.parsed_attr::<u32>(node, "index")?;
    let required_riddle = ctx.optional_parsed_attr::<u32>(node, "requires")?.map(RiddleId);
    let enables = ctx.optional_parsed_attr::<u32>(node, "enables")?.map(RiddleId);
    let speaker = ctx.required_attr(node, "speaker")?.to_string();

    let mut fields = FieldSet::new("Stage");
    let mut waiting = None;
    let mut advance = None;

    for field in node.children().filter(|child| child.is_element()) {
        match field.tag_name().name() {
            "waiting" => {
                fields.once(ctx, field)?;
                waiting = Some(ctx.required_text(field)?);
            }
            "advance" => {
                fields.once(ctx, field)?;
                advance = Some(ctx.required_text(field)?);
            }
            other => return Err(fields.unknown(ctx, other, field)),
        }
    }

    // A stage with no requirement never shows its waiting line.
    let waiting_line = match required_riddle {
        Some(_) => fields.required(ctx, node, "waiting", waiting)?,
        None => waiting.unwrap_or_default(),
    };

    Ok(StageDef {
        stage,
        required_riddle,
        enables,
        speaker,
        waiting_line,
        advance_line: fields.required(ctx, node, "advance", advance)?,
    })
}

fn parse_suspect(ctx: &Ctx<'_, '_>, node: Node<'_, '_>) -> Result<Suspect, ContentCompileError> {
    Ok(Suspect {
        id: ctx.required_attr(node, "id")?.to_string(),
        name: ctx.required_attr(node, "name")?.to_string(),
        suspicion: ctx.optional_suspicion_attr(node)?.unwrap_or(0),
    })
}

fn parse_map_ref(value: &str) -> MapRef {
    match value {
        "exterior" => MapRef::Exterior,
        id => MapRef::Interior(InteriorId::new(id)),
    }
}

/// Trims every line and drops leading and trailing blank lines, keeping
/// interior blank lines as paragraph breaks.
fn normalize_text(raw: &str) -> String {
    let lines = raw.lines().map(str::trim).collect::<Vec<_>>();
    let start = lines
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(start, |idx| idx + 1);
    lines[start..end].join("\n")
}

struct Ctx<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl Ctx<'_, '_> {
    fn location(&self, node: Node<'_, '_>) -> SourceLocation {
        let pos = self.doc.text_pos_at(node.range().start);
        SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }
    }

    fn error(
        &self,
        code: ContentErrorCode,
        message: String,
        node: Node<'_, '_>,
    ) -> ContentCompileError {
        self.error_at(code, message, self.location(node))
    }

    fn error_at(
        &self,
        code: ContentErrorCode,
        message: String,
        location: SourceLocation,
    ) -> ContentCompileError {
        ContentCompileError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(location),
        }
    }

    fn duplicate(&self, element: &str, id: &str, node: Node<'_, '_>) -> ContentCompileError {
        self.error(
            ContentErrorCode::DuplicateId,
            format!("duplicate <{element}> '{id}'"),
            node,
        )
    }

    fn required_attr<'n>(
        &self,
        node: Node<'n, '_>,
        name: &str,
    ) -> Result<&'n str, ContentCompileError> {
        match node.attribute(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.error(
                ContentErrorCode::MissingField,
                format!(
                    "missing required attribute '{name}' on <{}>",
                    node.tag_name().name()
                ),
                node,
            )),
        }
    }

    fn parsed_attr<T: FromStr>(
        &self,
        node: Node<'_, '_>,
        name: &str,
    ) -> Result<T, ContentCompileError> {
        let value = self.required_attr(node, name)?;
        self.parse_value(node, name, value)
    }

    fn optional_parsed_attr<T: FromStr>(
        &self,
        node: Node<'_, '_>,
        name: &str,
    ) -> Result<Option<T>, ContentCompileError> {
        node.attribute(name)
            .map(|value| self.parse_value(node, name, value.trim()))
            .transpose()
    }

    fn parse_value<T: FromStr>(
        &self,
        node: Node<'_, '_>,
        name: &str,
        value: &str,
    ) -> Result<T, ContentCompileError> {
        value.parse::<T>().map_err(|_| {
            self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "attribute '{name}' on <{}> has invalid value '{value}'",
                    node.tag_name().name()
                ),
                node,
            )
        })
    }

    fn optional_bool_attr(
        &self,
        node: Node<'_, '_>,
        name: &str,
    ) -> Result<Option<bool>, ContentCompileError> {
        self.optional_parsed_attr::<bool>(node, name)
    }

    fn optional_suspicion_attr(
        &self,
        node: Node<'_, '_>,
    ) -> Result<Option<u8>, ContentCompileError> {
        let suspicion = self.optional_parsed_attr::<u8>(node, "suspicion")?;
        if suspicion.is_some_and(|value| value > 100) {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                "suspicion must be between 0 and 100".to_string(),
                node,
            ));
        }
        Ok(suspicion)
    }

    fn required_text(&self, node: Node<'_, '_>) -> Result<String, ContentCompileError> {
        let value = normalize_text(node.text().unwrap_or_default());
        if value.is_empty() {
            return Err(self.error(
                ContentErrorCode::MissingField,
                format!("field <{}> must not be empty", node.tag_name().name()),
                node,
            ));
        }
        Ok(value)
    }
}

/// Tracks single-occurrence child fields of one element.
struct FieldSet {
    element: &'static str,
    seen: HashSet<String>,
}

impl FieldSet {
    fn new(element: &'static str) -> Self {
        Self {
            element,
            seen: HashSet::new(),
        }
    }

    fn once(&mut self, ctx: &Ctx<'_, '_>, field: Node<'_, '_>) -> Result<(), ContentCompileError> {
        let name = field.tag_name().name();
        if self.seen.insert(name.to_string()) {
            Ok(())
        } else {
            Err(ctx.error(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{name}> in <{}>", self.element),
                field,
            ))
        }
    }

    fn unknown(&self, ctx: &Ctx<'_, '_>, name: &str, field: Node<'_, '_>) -> ContentCompileError {
        ctx.error(
            ContentErrorCode::UnknownField,
            format!("unknown field <{name}> in <{}>", self.element),
            field,
        )
    }

    fn required(
        &self,
        ctx: &Ctx<'_, '_>,
        node: Node<'_, '_>,
        name: &str,
        value: Option<String>,
    ) -> Result<String, ContentCompileError> {
        value.ok_or_else(|| {
            ctx.error(
                ContentErrorCode::MissingField,
                format!("missing required field <{name}> in <{}>", self.element),
                node,
            )
        })
    }
}
