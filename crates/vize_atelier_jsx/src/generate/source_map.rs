//! Source map v3 output.

use serde::Serialize;
use vize_carton::FxHashMap;
use vize_relief::Position;

const VERSION: u32 = 3;

const B64_DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Serialized source map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    column: u32,
    source_line: u32,
    source_column: u32,
    name: Option<u32>,
}

/// Collects mappings from generated positions to source positions.
///
/// Mappings must be added in generated-code order.
pub struct SourceMapGenerator {
    file: String,
    source: String,
    names: Vec<String>,
    name_index: FxHashMap<String, u32>,
    lines: Vec<Vec<Segment>>,
}

impl SourceMapGenerator {
    pub fn new(file: &str, source: &str) -> Self {
        Self {
            file: file.to_owned(),
            source: source.to_owned(),
            names: Vec::new(),
            name_index: FxHashMap::default(),
            lines: Vec::new(),
        }
    }

    /// Column of `offset` in UTF-16 units, zero-based.
    fn source_column(&self, position: Position) -> u32 {
        let offset = (position.offset as usize).min(self.source.len());
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        self.source
            .get(line_start..offset)
            .map_or(position.column.saturating_sub(1), |text| {
                text.encode_utf16().count() as u32
            })
    }

    pub fn add_mapping(&mut self, line: u32, column: u32, source: Position, name: Option<&str>) {
        let name = name.map(|name| {
            if let Some(&index) = self.name_index.get(name) {
                return index;
            }
            let index = self.names.len() as u32;
            self.names.push(name.to_owned());
            self.name_index.insert(name.to_owned(), index);
            index
        });
        let segment = Segment {
            column,
            source_line: source.line.saturating_sub(1),
            source_column: self.source_column(source),
            name,
        };
        let line = line as usize;
        if self.lines.len() <= line {
            self.lines.resize_with(line + 1, Vec::new);
        }
        let segments = &mut self.lines[line];
        // Two mappings at one generated column: the later one wins.
        if segments.last().is_some_and(|last| last.column == column) {
            segments.pop();
        }
        segments.push(segment);
    }

    pub fn finish(self) -> SourceMap {
        let mut mappings = String::new();
        let mut last_source_line = 0i64;
        let mut last_source_column = 0i64;
        let mut last_name = 0i64;

        for (i, segments) in self.lines.iter().enumerate() {
            if i > 0 {
                mappings.push(';');
            }
            let mut last_column = 0i64;
            for (j, segment) in segments.iter().enumerate() {
                if j > 0 {
                    mappings.push(',');
                }
                push_vlq(&mut mappings, segment.column as i64 - last_column);
                last_column = segment.column as i64;
                // single source
                push_vlq(&mut mappings, 0);
                push_vlq(&mut mappings, segment.source_line as i64 - last_source_line);
                last_source_line = segment.source_line as i64;
                push_vlq(&mut mappings, segment.source_column as i64 - last_source_column);
                last_source_column = segment.source_column as i64;
                if let Some(name) = segment.name {
                    push_vlq(&mut mappings, name as i64 - last_name);
                    last_name = name as i64;
                }
            }
        }

        SourceMap {
            version: VERSION,
            file: self.file.clone(),
            sources: vec![self.file],
            sources_content: vec![self.source],
            names: self.names,
            mappings,
        }
    }
}

fn push_vlq(out: &mut String, value: i64) {
    let mut value = if value < 0 {
        ((-value) << 1) + 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (value & 31) as usize;
        value >>= 5;
        if value > 0 {
            digit |= 32;
        }
        out.push(B64_DIGITS[digit] as char);
        if value == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlq(value: i64) -> String {
        let mut out = String::new();
        push_vlq(&mut out, value);
        out
    }

    #[test]
    fn test_vlq() {
        assert_eq!(vlq(0), "A");
        assert_eq!(vlq(1), "C");
        assert_eq!(vlq(-1), "D");
        assert_eq!(vlq(16), "gB");
    }

    #[test]
    fn test_mappings() {
        let mut generator = SourceMapGenerator::new("a.jsx", "<div>\n{foo}</div>");
        generator.add_mapping(0, 4, Position::new(7, 2, 2), Some("foo"));
        generator.add_mapping(1, 2, Position::new(10, 2, 5), None);
        let map = generator.finish();
        assert_eq!(map.names, vec!["foo"]);
        assert_eq!(map.mappings, "IACCA;EAAG");
        assert_eq!(map.sources, vec!["a.jsx"]);
        assert!(map.to_json().contains(r#""sourcesContent":["<div>\n{foo}</div>"]"#));
    }
}
