//! XML form of the dataset.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <stories>
//!   <story>
//!     <id>0</id>
//!     <filename>doc.pdf</filename>
//!     <title>Title</title>
//!     <body>Body</body>
//!   </story>
//! </stories>
//! ```

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use storyset_core::Record;

use crate::ReportError;

pub const ROOT_TAG: &str = "stories";
pub const STORY_TAG: &str = "story";

/// Which field of a record a child element holds.
#[derive(Clone, Copy)]
enum Field {
    Id,
    Filename,
    Title,
    Body,
}

impl Field {
    const ALL: [Field; 4] = [Field::Id, Field::Filename, Field::Title, Field::Body];

    fn element_name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Filename => "filename",
            Field::Title => "title",
            Field::Body => "body",
        }
    }

    fn from_element_name(name: &[u8]) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.element_name().as_bytes() == name)
    }
}

fn write_field<W: Write>(
    writer: &mut Writer<W>,
    field: Field,
    text: &str,
) -> Result<(), ReportError> {
    let name = field.element_name();
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Serialize `records` as an indented UTF-8 XML document.
pub fn write_xml<W: Write>(records: &[Record], out: W) -> Result<(), ReportError> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;

    for record in records {
        writer.write_event(Event::Start(BytesStart::new(STORY_TAG)))?;
        write_field(&mut writer, Field::Id, &record.id.to_string())?;
        write_field(&mut writer, Field::Filename, &record.filename)?;
        write_field(&mut writer, Field::Title, &record.title)?;
        write_field(&mut writer, Field::Body, &record.body)?;
        writer.write_event(Event::End(BytesEnd::new(STORY_TAG)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Serialize `records` into a string.
pub fn to_xml_string(records: &[Record]) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_xml(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ReportError::Invalid(e.to_string()))
}

/// Parse a dataset previously written by [`write_xml`].
///
/// Whitespace inside field elements is kept as written; indentation between
/// elements is ignored.
pub fn read_xml(xml: &str) -> Result<Vec<Record>, ReportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    let mut reading: Option<Field> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                if name.as_ref() == STORY_TAG.as_bytes() {
                    current = Some(Record {
                        id: 0,
                        filename: String::new(),
                        title: String::new(),
                        body: String::new(),
                    });
                } else if current.is_some() {
                    reading = Field::from_element_name(name.as_ref());
                    text_buf.clear();
                }
            }
            Event::Text(t) if reading.is_some() => {
                text_buf.push_str(&t.unescape()?);
            }
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == STORY_TAG.as_bytes() {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                } else if let (Some(field), Some(record)) = (reading.take(), current.as_mut()) {
                    let text = std::mem::take(&mut text_buf);
                    match field {
                        Field::Id => {
                            record.id = text.trim().parse().map_err(|_| {
                                ReportError::Invalid(format!("story id is not a number: {:?}", text))
                            })?
                        }
                        Field::Filename => record.filename = text,
                        Field::Title => record.title = text,
                        Field::Body => record.body = text,
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}
