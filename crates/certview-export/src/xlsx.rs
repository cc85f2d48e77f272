//! Spreadsheet serializer.
//!
//! Writes one sheet: a bold header row followed by the flat rows, every value
//! as a literal string. The certification column carries the text number
//! format so codes like `10` or `2023-1` are never reinterpreted as numbers
//! or dates by the host application.

use certview_core::columns::{Column, ColumnSet};
use rust_xlsxwriter::{Format, Workbook};

use crate::{error::Result, flatten::FlatRow};

pub const SHEET_NAME: &str = "Certificações";

/// Excel's built-in "Text" number format.
const TEXT_FORMAT: &str = "@";

fn column_width(column: Column) -> f64 {
  match column {
    Column::Name | Column::Email => 32.0,
    Column::TaxId | Column::Phone => 16.0,
    _ => 18.0,
  }
}

pub(crate) fn serialize(rows: &[FlatRow], columns: &ColumnSet) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  let header = Format::new().set_bold();
  let text = Format::new().set_num_format(TEXT_FORMAT);

  let sheet = workbook.add_worksheet();
  sheet.set_name(SHEET_NAME)?;

  for (index, column) in columns.iter().enumerate() {
    let col = index as u16;
    sheet.set_column_width(col, column_width(column))?;
    if column == Column::Certification {
      sheet.set_column_format(col, &text)?;
    }
    sheet.write_string_with_format(0, col, column.label(), &header)?;
  }

  for (index, row) in rows.iter().enumerate() {
    let r = (index + 1) as u32;
    for (col, column) in columns.iter().enumerate() {
      let value = row.cell(column);
      if value.is_empty() {
        continue;
      }
      let col = col as u16;
      if column == Column::Certification {
        sheet.write_string_with_format(r, col, value, &text)?;
      } else {
        sheet.write_string(r, col, value)?;
      }
    }
  }

  Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
  use std::io::{Cursor, Read};

  use certview_core::record::{Certification, PersonRecord};

  use super::*;
  use crate::flatten::flatten;

  fn part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
  }

  fn records() -> Vec<PersonRecord> {
    let mut ana = PersonRecord::new("01234567890", "Ana");
    ana.certifications.push(Certification {
      name:                     "CPA-20".into(),
      first_certification_date: "11/11/2011".into(),
      last_update_date:         "29/12/2023".into(),
      due_date:                 "01/01/2025".into(),
      status:                   "Ativa".into(),
    });
    let bia = PersonRecord { note: Some("Pendente".into()), ..PersonRecord::new("2", "Bia") };
    vec![ana, bia]
  }

  #[test]
  fn writes_a_zip_workbook_with_one_named_sheet() {
    let bytes = serialize(&flatten(&records()), &ColumnSet::basic()).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let workbook = part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains(SHEET_NAME), "{workbook}");
    assert_eq!(workbook.matches("<sheet ").count(), 1);
  }

  #[test]
  fn values_are_literal_strings() {
    let bytes = serialize(&flatten(&records()), &ColumnSet::basic()).unwrap();

    let strings = part(&bytes, "xl/sharedStrings.xml");
    for expected in ["CPF", "Vencimento", "01234567890", "CPA-20", "01/01/2025", "active", "Pendente"] {
      assert!(strings.contains(expected), "missing {expected}: {strings}");
    }

    let sheet = part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains("<f>"), "no formulas expected");
  }

  /// Value of `attr` on the first element starting at `tag`.
  fn attr<'a>(xml: &'a str, tag: &str, attr: &str) -> Option<&'a str> {
    let start = xml.find(tag)?;
    let element = &xml[start..start + xml[start..].find('>')?];
    let needle = format!(" {attr}=\"");
    let value = &element[element.find(&needle)? + needle.len()..];
    Some(&value[..value.find('"')?])
  }

  /// Index into `cellXfs` of the style carrying the custom `@` format.
  fn text_style_index(styles: &str) -> usize {
    let num_fmt = &styles[..styles.find(r#"formatCode="@""#).expect("no text format")];
    let id = &num_fmt[num_fmt.rfind("numFmtId=\"").unwrap() + 10..];
    let id = &id[..id.find('"').unwrap()];

    let xfs = &styles[styles.find("<cellXfs").unwrap()..styles.find("</cellXfs>").unwrap()];
    xfs
      .split("<xf ")
      .skip(1)
      .position(|xf| xf.contains(&format!(r#"numFmtId="{id}""#)))
      .expect("no cell style uses the text format")
  }

  #[test]
  fn certification_column_uses_text_format() {
    let bytes = serialize(&flatten(&records()), &ColumnSet::basic()).unwrap();
    let styles = part(&bytes, "xl/styles.xml");
    let sheet = part(&bytes, "xl/worksheets/sheet1.xml");

    let text = text_style_index(&styles).to_string();
    // C is the certification column; row 2 holds a code, row 3 a note.
    assert_eq!(attr(&sheet, r#"<c r="C2""#, "s"), Some(text.as_str()), "{sheet}");
    assert_eq!(attr(&sheet, r#"<c r="C3""#, "s"), Some(text.as_str()), "{sheet}");
    assert_ne!(attr(&sheet, r#"<c r="B2""#, "s"), Some(text.as_str()), "{sheet}");
  }
}
