use super::error::MorphologyError;
use super::model::{Morphology, Section};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, instrument};

fn read_attributes(
    start: &BytesStart<'_>,
    lowercase: bool,
) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let mut key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if lowercase {
            key = key.to_lowercase();
        }
        attributes.push((key, attr.unescape_value()?.into_owned()));
    }
    Ok(attributes)
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

impl Morphology {
    pub fn from_xml_str(content: &str) -> Result<Self, MorphologyError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let xml_err = |reader: &Reader<&[u8]>, source: quick_xml::Error| MorphologyError::Xml {
            position: reader.buffer_position() as u64,
            source,
        };

        let mut morphology = Morphology {
            root_tag: String::new(),
            root_attributes: Vec::new(),
            config_tag: String::new(),
            config_attributes: Vec::new(),
            sections: Vec::new(),
        };
        let mut depth = 0usize;
        let mut current: Option<Section> = None;
        let mut seen_config = false;

        loop {
            match reader.read_event().map_err(|e| xml_err(&reader, e))? {
                Event::Start(start) => match depth {
                    0 => {
                        morphology.root_tag = tag_name(&start);
                        morphology.root_attributes =
                            read_attributes(&start, false).map_err(|e| xml_err(&reader, e))?;
                        depth = 1;
                    }
                    1 => {
                        morphology.config_tag = tag_name(&start);
                        morphology.config_attributes =
                            read_attributes(&start, false).map_err(|e| xml_err(&reader, e))?;
                        seen_config = true;
                        depth = 2;
                    }
                    2 => {
                        current = Some(Section {
                            tag: tag_name(&start),
                            attributes: read_attributes(&start, true)
                                .map_err(|e| xml_err(&reader, e))?,
                            rows: Vec::new(),
                        });
                        depth = 3;
                    }
                    _ => {
                        let end = start.to_end().into_owned();
                        reader
                            .read_to_end(end.name())
                            .map_err(|e| xml_err(&reader, e))?;
                    }
                },
                Event::Empty(start) => match depth {
                    0 => {
                        morphology.root_tag = tag_name(&start);
                        morphology.root_attributes =
                            read_attributes(&start, false).map_err(|e| xml_err(&reader, e))?;
                        break;
                    }
                    1 => {
                        morphology.config_tag = tag_name(&start);
                        morphology.config_attributes =
                            read_attributes(&start, false).map_err(|e| xml_err(&reader, e))?;
                        seen_config = true;
                    }
                    2 => morphology.sections.push(Section {
                        tag: tag_name(&start),
                        attributes: read_attributes(&start, true)
                            .map_err(|e| xml_err(&reader, e))?,
                        rows: Vec::new(),
                    }),
                    _ => {}
                },
                Event::Text(text) => {
                    if let Some(section) = current.as_mut() {
                        let text = text.unescape().map_err(|e| xml_err(&reader, e))?;
                        section.rows.extend(
                            text.lines()
                                .map(|line| {
                                    line.split_whitespace()
                                        .map(str::to_string)
                                        .collect::<Vec<_>>()
                                })
                                .filter(|row| !row.is_empty()),
                        );
                    }
                }
                Event::End(_) => {
                    if depth == 3 {
                        if let Some(section) = current.take() {
                            morphology.sections.push(section);
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_config {
            return Err(MorphologyError::MissingConfiguration);
        }
        debug!(
            sections = morphology.sections.len(),
            atoms = morphology.atom_count(),
            "Parsed morphology."
        );
        Ok(morphology)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, MorphologyError> {
        let content = std::fs::read_to_string(path).map_err(|e| MorphologyError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_xml_str(&content)
    }

    /// Writes the morphology exactly as held in memory.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), MorphologyError> {
        writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            writer,
            "<{}{}>",
            self.root_tag,
            format_attributes(&self.root_attributes)
        )?;
        writeln!(
            writer,
            "<{}{}>",
            self.config_tag,
            format_attributes(&self.config_attributes)
        )?;
        for section in &self.sections {
            let attrs = format_attributes(&section.attributes);
            if section.rows.is_empty() {
                writeln!(writer, "<{}{}/>", section.tag, attrs)?;
                continue;
            }
            writeln!(writer, "<{}{}>", section.tag, attrs)?;
            for row in &section.rows {
                let line = row
                    .iter()
                    .map(|token| escape(token.as_str()).into_owned())
                    .collect::<Vec<_>>()
                    .join("\t");
                writeln!(writer, "{}", line)?;
            }
            writeln!(writer, "</{}>", section.tag)?;
        }
        writeln!(writer, "</{}>", self.config_tag)?;
        writeln!(writer, "</{}>", self.root_tag)?;
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String, MorphologyError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Saves the morphology, wrapping positions into the periodic box first
    /// when the snapshot has both a box and positions.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<(), MorphologyError> {
        let mut output = self.clone();
        if output.section("box").is_some() && output.section("position").is_some() {
            output.wrap_positions()?;
        }
        let file = File::create(path).map_err(|e| MorphologyError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        output.write_to(&mut writer)?;
        writer.flush()?;
        debug!("Morphology written to {:?}", path);
        Ok(())
    }
}

fn format_attributes(attributes: &[(String, String)]) -> String {
    attributes
        .iter()
        .map(|(k, v)| format!(" {}=\"{}\"", k, escape(v.as_str())))
        .collect()
}
