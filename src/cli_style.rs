use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

// ───────────────────────────────────────────────────────────────────────────────
// Clap Styles
// ───────────────────────────────────────────────────────────────────────────────

pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Blue))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ───────────────────────────────────────────────────────────────────────────────
// Palette
// ───────────────────────────────────────────────────────────────────────────────

pub mod colors {
    use crossterm::style::Color;

    pub const CHROME: Color = Color::Rgb {
        r: 200,
        g: 210,
        b: 220,
    };
    pub const RACING_RED: Color = Color::Rgb {
        r: 220,
        g: 40,
        b: 50,
    };
    pub const AMBER: Color = Color::Rgb {
        r: 255,
        g: 176,
        b: 0,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 60,
        g: 200,
        b: 120,
    };
    pub const BLUE: Color = Color::Rgb {
        r: 90,
        g: 150,
        b: 240,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

mod box_chars {
    pub const TOP_LEFT: &str = "╭";
    pub const TOP_RIGHT: &str = "╮";
    pub const BOTTOM_LEFT: &str = "╰";
    pub const BOTTOM_RIGHT: &str = "╯";
    pub const HORIZONTAL: &str = "─";
    pub const VERTICAL: &str = "│";
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ───────────────────────────────────────────────────────────────────────────────
// Banner
// ───────────────────────────────────────────────────────────────────────────────

pub fn print_banner() {
    let banner = r#"
   ███████╗██╗  ██╗ ██████╗ ██╗    ██╗██████╗  ██████╗  ██████╗ ███╗   ███╗
   ██╔════╝██║  ██║██╔═══██╗██║    ██║██╔══██╗██╔═══██╗██╔═══██╗████╗ ████║
   ███████╗███████║██║   ██║██║ █╗ ██║██████╔╝██║   ██║██║   ██║██╔████╔██║
   ╚════██║██╔══██║██║   ██║██║███╗██║██╔══██╗██║   ██║██║   ██║██║╚██╔╝██║
   ███████║██║  ██║╚██████╔╝╚███╔███╔╝██║  ██║╚██████╔╝╚██████╔╝██║ ╚═╝ ██║
   ╚══════╝╚═╝  ╚═╝ ╚═════╝  ╚══╝╚══╝ ╚═╝  ╚═╝ ╚═════╝  ╚═════╝ ╚═╝     ╚═╝
"#;

    for (i, line) in banner.lines().enumerate() {
        let color = if i < 4 {
            colors::CHROME
        } else {
            colors::RACING_RED
        };
        println!("{}", line.with(color).bold());
    }
    println!("{}", "   ───────────────  DEALERSHIP CONSOLE  ───────────────".with(colors::DIM));
    println!();
}

// ───────────────────────────────────────────────────────────────────────────────
// Status Indicators
// ───────────────────────────────────────────────────────────────────────────────

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    println!(
        " {} {}",
        box_chars::CROSS_MARK.with(colors::RACING_RED).bold(),
        message.with(colors::RACING_RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::AMBER).bold(),
        message.with(colors::AMBER)
    );
}

pub fn print_info(message: &str) {
    println!(
        " {} {}",
        "ℹ".with(colors::BLUE).bold(),
        message.with(colors::BLUE)
    );
}

// ───────────────────────────────────────────────────────────────────────────────
// Sections, key-values and lists
// ───────────────────────────────────────────────────────────────────────────────

pub fn print_section_header(title: &str) {
    let width: usize = 60;
    let title_len = title.width();
    let padding = width.saturating_sub(title_len + 4) / 2;

    println!();
    println!(
        "{}{} {} {}{}",
        box_chars::TOP_LEFT.with(colors::CHROME),
        box_chars::HORIZONTAL.repeat(padding).with(colors::CHROME),
        title
            .with(colors::CHROME)
            .bold()
            .attribute(Attribute::Italic),
        box_chars::HORIZONTAL
            .repeat(width.saturating_sub(title_len + 4 + padding))
            .with(colors::CHROME),
        box_chars::TOP_RIGHT.with(colors::CHROME)
    );
}

pub fn print_section_footer() {
    println!(
        "{}{}{}",
        box_chars::BOTTOM_LEFT.with(colors::CHROME),
        box_chars::HORIZONTAL.repeat(60).with(colors::CHROME),
        box_chars::BOTTOM_RIGHT.with(colors::CHROME)
    );
    println!();
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::RACING_RED),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    println!(
        "{}{}  {}",
        "  ".repeat(indent),
        box_chars::ARROW_RIGHT.with(colors::CHROME),
        item.with(colors::WHITE)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

// ───────────────────────────────────────────────────────────────────────────────
// Tables
// ───────────────────────────────────────────────────────────────────────────────

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: &[&str]) -> Self {
        TableBuilder {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            col_widths: headers.iter().map(|h| h.width()).collect(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.col_widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.width());
        }
        self.rows.push(row);
    }

    fn print_border(&self, left: &str, junction: &str, right: &str) {
        let segments: Vec<String> = self
            .col_widths
            .iter()
            .map(|width| box_chars::HORIZONTAL.repeat(width + 2))
            .collect();
        println!(
            "{}",
            format!("{}{}{}", left, segments.join(junction), right).with(colors::CHROME)
        );
    }

    fn print_cells(&self, cells: &[String], color: CtColor, bold: bool) {
        print!("{}", box_chars::VERTICAL.with(colors::CHROME));
        for (i, width) in self.col_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = width.saturating_sub(cell.width());
            let styled = cell.with(color);
            let styled = if bold { styled.bold() } else { styled };
            print!(" {}{} ", styled, " ".repeat(padding));
            print!("{}", box_chars::VERTICAL.with(colors::CHROME));
        }
        println!();
    }

    pub fn print(&self) {
        self.print_border(box_chars::TOP_LEFT, box_chars::T_TOP, box_chars::TOP_RIGHT);
        self.print_cells(&self.headers, colors::CHROME, true);
        self.print_border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT);
        for row in &self.rows {
            self.print_cells(row, colors::WHITE, false);
        }
        self.print_border(
            box_chars::BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::BOTTOM_RIGHT,
        );
    }
}

// ───────────────────────────────────────────────────────────────────────────────
// Welcome / Goodbye
// ───────────────────────────────────────────────────────────────────────────────

pub fn print_welcome(api_url: &str, storage_path: &str) {
    print_banner();
    print_key_value("Backend", api_url);
    print_key_value("Local storage", storage_path);
    print_key_value("Version", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  {}", "Type 'help' for available commands".with(colors::DIM));
    println!();
}

pub fn get_prompt(username: Option<&str>) -> String {
    match username {
        Some(username) => format!("{} {} ", username.with(colors::CHROME), "❯".with(colors::RACING_RED).bold()),
        None => format!("{} ", "❯".with(colors::DIM).bold()),
    }
}

pub fn print_goodbye() {
    println!();
    println!(
        "  {}",
        "Goodbye! Drive safe.".with(colors::RACING_RED).bold()
    );
    println!();
}
