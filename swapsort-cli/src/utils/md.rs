use std::io::IsTerminal;

use polars::prelude::*;

pub fn print_md(s: impl AsRef<str>) {
    let mut printer = MarkdownPrinter::new();
    printer.add(s);
    printer.dump();
}

/// Collects markdown text and prints it with termimad on a terminal, or as plain text otherwise.
pub struct MarkdownPrinter {
    content: String,
}

impl MarkdownPrinter {
    pub fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    fn is_tty(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    pub fn dump(&self) {
        if self.is_tty() {
            let mut skin = termimad::MadSkin::default();
            for header in skin.headers.iter_mut() {
                header.align = termimad::Alignment::Left;
                header.add_attr(termimad::crossterm::style::Attribute::Bold);
                header.set_fg(termimad::crossterm::style::Color::Blue);
            }
            skin.headers[0].set_bg(termimad::crossterm::style::Color::Blue);
            skin.headers[0].add_attr(termimad::crossterm::style::Attribute::NoUnderline);
            skin.print_text(&self.content);
        } else {
            println!("{}", self.content);
        }
    }

    pub fn add(&mut self, s: impl AsRef<str>) {
        self.content.push_str(s.as_ref());
    }

    pub fn add_dataframe(&mut self, df: &DataFrame) {
        let md_table = df_to_markdown(df, self.is_tty());
        self.content.push_str(&md_table);
    }
}

fn fmt_value(v: &AnyValue) -> (String, bool) {
    match v {
        AnyValue::Float32(v) => (format!("{:.1}", v), true),
        AnyValue::Float64(v) => (format!("{:.1}", v), true),
        AnyValue::UInt32(v) => (format!("{}", v), true),
        AnyValue::UInt64(v) => (format!("{}", v), true),
        AnyValue::Int32(v) => (format!("{}", v), true),
        AnyValue::Int64(v) => (format!("{}", v), true),
        AnyValue::Null => ("-".to_owned(), true),
        _ => {
            if let Some(v) = v.get_str() {
                (v.to_string(), false)
            } else {
                (format!("{}", v), true)
            }
        }
    }
}

/// Render a dataframe as a markdown table. Numeric columns are right-aligned.
pub fn df_to_markdown(df: &DataFrame, outer_rules: bool) -> String {
    // Collect cell strings by columns
    let mut cols = vec![];
    let mut col_align_r = vec![];
    for col in df.get_columns() {
        let mut c = vec![col.name().to_owned()];
        let mut align_right = true;
        for i in 0..col.len() {
            let (v, r) = col
                .get(i)
                .map(|v| fmt_value(&v))
                .unwrap_or_else(|_| ("-".to_owned(), true));
            c.push(v);
            if i == 0 {
                align_right = r;
            }
        }
        col_align_r.push(align_right);
        cols.push(c);
    }
    if cols.is_empty() {
        return String::new();
    }
    // Get each column's max width
    let col_widths = cols
        .iter()
        .map(|col| col.iter().map(|s| s.chars().count()).max().unwrap_or(0))
        .collect::<Vec<_>>();
    // Update cols with padded strings
    for (j, col) in cols.iter_mut().enumerate() {
        for cell in col.iter_mut() {
            let pad = col_widths[j] - cell.chars().count();
            cell.push_str(&" ".repeat(pad));
        }
    }
    // Construct markdown table string, row by row
    let rule = |align: bool| {
        if !align {
            let mid = col_widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join(" | ");
            return "| ".to_string() + mid.as_str() + " |\n";
        }
        let mut s = "|".to_string();
        for (i, w) in col_widths.iter().enumerate() {
            s += if col_align_r[i] { " " } else { ":" };
            s += &"-".repeat(*w);
            s += if col_align_r[i] { ":" } else { " " };
            s += "|";
        }
        s + "\n"
    };
    let rows = cols[0].len();
    let mut md = String::new();
    if outer_rules {
        md += &rule(false);
    }
    for i in 0..rows {
        let values = cols.iter().map(|c| c[i].as_str()).collect::<Vec<_>>();
        md += &("| ".to_string() + values.join(" | ").as_str() + " |\n");
        if i == 0 {
            md += &rule(true);
        } else if outer_rules && i == rows - 1 {
            md += &rule(false);
        }
    }
    md
}

#[macro_export]
macro_rules! print_md {
    ($($arg:tt)*) => {
        $crate::utils::md::print_md(format!($($arg)*));
    };
}
