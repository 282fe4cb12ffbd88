//! # Printer Settings
//!
//! The full configuration of one printer profile, and its flat record form.
//!
//! ## Storage Form
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PrinterSettings (typed)          PrinterRecord (persisted JSON)        │
//! │                                                                         │
//! │  unit: Unit::Inch         ──────► "unit": 2                             │
//! │  paper_size: 210x297 mm   ──────► "paper_size": [210.0, 297.0]          │
//! │  margins: 0,0,0,0 mm      ──────► "page_margins": [0.0, 0.0, 0.0, 0.0]  │
//! │  printer_mode: High       ──────► "printer_mode": 2                     │
//! │                                                                         │
//! │  Sizes and margins are always stored in millimetres. The `unit` field   │
//! │  only records which unit the user works in.                             │
//! │                                                                         │
//! │  Restoring applies printer_mode first (it resets the resolution),       │
//! │  then unit, then sizes and margins.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enum codes match the ones native print dialogs use, so records written
//! by older installations stay readable.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{PrintingError, PrintingResult};
use crate::validation::validate_copy_count;

// =============================================================================
// Coded Enums
// =============================================================================

/// Declares an enum stored as an integer code.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored integer code.
            pub fn code(self) -> i32 {
                match self {
                    $( $name::$variant => $code, )+
                }
            }

            /// Variant for a stored code.
            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Human readable name.
            pub fn display_name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }
    };
}

coded_enum! {
    /// Measurement unit for paper sizes and margins.
    pub enum Unit {
        #[default]
        Millimeter = 0 => "Millimeter",
        Point = 1 => "Point",
        Inch = 2 => "Inch",
        Pica = 3 => "Pica",
        Didot = 4 => "Didot",
        Cicero = 5 => "Cicero",
        DevicePixel = 6 => "Device Pixel",
    }
}

coded_enum! {
    /// Page orientation.
    pub enum Orientation {
        #[default]
        Portrait = 0 => "Portrait",
        Landscape = 1 => "Landscape",
    }
}

coded_enum! {
    /// Where the output goes.
    pub enum OutputFormat {
        #[default]
        Native = 0 => "Native",
        Pdf = 1 => "PDF",
        PostScript = 2 => "PostScript",
    }
}

coded_enum! {
    /// Which pages get printed.
    pub enum PrintRange {
        #[default]
        AllPages = 0 => "All Pages",
        Selection = 1 => "Selection",
        PageRange = 2 => "Page Range",
        CurrentPage = 3 => "Current Page",
    }
}

coded_enum! {
    /// Resolution class the printer was created with.
    pub enum PrinterMode {
        #[default]
        ScreenResolution = 0 => "Screen Resolution",
        PrinterResolution = 1 => "Printer Resolution",
        HighResolution = 2 => "High Resolution",
    }
}

coded_enum! {
    /// Color or grayscale output.
    pub enum ColorMode {
        GrayScale = 0 => "Grayscale",
        #[default]
        Color = 1 => "Color",
    }
}

coded_enum! {
    /// Order of printed pages.
    pub enum PageOrder {
        #[default]
        FirstPageFirst = 0 => "First Page First",
        LastPageFirst = 1 => "Last Page First",
    }
}

coded_enum! {
    /// Duplex printing mode.
    pub enum DuplexMode {
        #[default]
        None = 0 => "None",
        Auto = 1 => "Auto",
        LongSide = 2 => "Long Side",
        ShortSide = 3 => "Short Side",
    }
}

coded_enum! {
    /// Paper tray.
    pub enum PaperSource {
        OnlyOne = 0 => "Only One",
        Lower = 1 => "Lower",
        Middle = 2 => "Middle",
        Manual = 3 => "Manual",
        Envelope = 4 => "Envelope",
        EnvelopeManual = 5 => "Envelope Manual",
        #[default]
        Auto = 6 => "Auto",
        Tractor = 7 => "Tractor",
        SmallFormat = 8 => "Small Format",
        LargeFormat = 9 => "Large Format",
        LargeCapacity = 10 => "Large Capacity",
        Cassette = 11 => "Cassette",
        FormSource = 12 => "Form Source",
    }
}

impl Unit {
    /// Millimetres per unit. Device pixels depend on the resolution.
    pub fn millimetres(self, resolution: i32) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Point => 25.4 / 72.0,
            Unit::Inch => 25.4,
            Unit::Pica => 25.4 / 6.0,
            Unit::Didot => 0.375_972,
            Unit::Cicero => 0.375_972 * 12.0,
            Unit::DevicePixel => 25.4 / f64::from(resolution.max(1)),
        }
    }
}

impl PrinterMode {
    /// Resolution (dpi) a printer starts with in this mode.
    pub fn default_resolution(self) -> i32 {
        match self {
            PrinterMode::ScreenResolution => 96,
            PrinterMode::PrinterResolution => 300,
            PrinterMode::HighResolution => 1200,
        }
    }
}

// =============================================================================
// Printer Settings
// =============================================================================

/// Typed printer configuration.
///
/// Paper size and margins are held in millimetres; use the unit-aware
/// accessors to read or write them in another unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterSettings {
    pub printer_name: String,
    pub unit: Unit,
    pub orientation: Orientation,
    paper_size_mm: (f64, f64),
    resolution: i32,
    pub full_page: bool,
    copy_count: i32,
    pub output_format: OutputFormat,
    pub output_filename: String,
    pub print_range: PrintRange,
    pub from_page: i32,
    pub to_page: i32,
    printer_mode: PrinterMode,
    pub color_mode: ColorMode,
    pub page_order: PageOrder,
    margins_mm: [f64; 4],
    pub duplex: DuplexMode,
    pub double_sided: bool,
    pub font_embedding: bool,
    pub paper_source: PaperSource,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        PrinterSettings::new(PrinterMode::default())
    }
}

impl PrinterSettings {
    /// A4 portrait settings for the given printer mode.
    pub fn new(mode: PrinterMode) -> Self {
        PrinterSettings {
            printer_name: String::new(),
            unit: Unit::Millimeter,
            orientation: Orientation::Portrait,
            paper_size_mm: (210.0, 297.0),
            resolution: mode.default_resolution(),
            full_page: false,
            copy_count: 1,
            output_format: OutputFormat::Native,
            output_filename: String::new(),
            print_range: PrintRange::AllPages,
            from_page: 0,
            to_page: 0,
            printer_mode: mode,
            color_mode: ColorMode::Color,
            page_order: PageOrder::FirstPageFirst,
            margins_mm: [0.0; 4],
            duplex: DuplexMode::None,
            double_sided: false,
            font_embedding: true,
            paper_source: PaperSource::Auto,
        }
    }

    pub fn printer_mode(&self) -> PrinterMode {
        self.printer_mode
    }

    /// Switches the printer mode, resetting the resolution to that mode's
    /// default.
    pub fn set_printer_mode(&mut self, mode: PrinterMode) {
        self.printer_mode = mode;
        self.resolution = mode.default_resolution();
    }

    pub fn resolution(&self) -> i32 {
        self.resolution
    }

    /// Stored as given; unit conversion treats anything below 1 dpi as 1.
    pub fn set_resolution(&mut self, dpi: i32) {
        self.resolution = dpi;
    }

    pub fn copy_count(&self) -> i32 {
        self.copy_count
    }

    /// Sets the number of copies (1..=999).
    pub fn set_copy_count(&mut self, count: i32) -> PrintingResult<()> {
        validate_copy_count(count)?;
        self.copy_count = count;
        Ok(())
    }

    fn factor(&self, unit: Unit) -> f64 {
        unit.millimetres(self.resolution)
    }

    /// Paper size expressed in `unit`.
    pub fn paper_size(&self, unit: Unit) -> (f64, f64) {
        let f = self.factor(unit);
        (self.paper_size_mm.0 / f, self.paper_size_mm.1 / f)
    }

    pub fn set_paper_size(&mut self, size: (f64, f64), unit: Unit) {
        let f = self.factor(unit);
        self.paper_size_mm = (size.0 * f, size.1 * f);
    }

    /// Page margins (left, top, right, bottom) expressed in `unit`.
    pub fn page_margins(&self, unit: Unit) -> [f64; 4] {
        let f = self.factor(unit);
        self.margins_mm.map(|m| m / f)
    }

    pub fn set_page_margins(&mut self, margins: [f64; 4], unit: Unit) {
        let f = self.factor(unit);
        self.margins_mm = margins.map(|m| m * f);
    }

    // -------------------------------------------------------------------------
    // Record conversion
    // -------------------------------------------------------------------------

    /// Flattens the settings into their persisted form.
    pub fn to_record(&self) -> PrinterRecord {
        PrinterRecord {
            name: self.printer_name.clone(),
            unit: self.unit.code(),
            orientation: self.orientation.code(),
            paper_size: self.paper_size(Unit::Millimeter),
            resolution: self.resolution,
            full_page: self.full_page,
            copy_count: self.copy_count,
            output_format: self.output_format.code(),
            output_filename: self.output_filename.clone(),
            print_range: self.print_range.code(),
            print_from: self.from_page,
            print_to: self.to_page,
            printer_mode: self.printer_mode.code(),
            color_mode: self.color_mode.code(),
            page_order: self.page_order.code(),
            page_margins: self.page_margins(Unit::Millimeter),
            duplex: self.duplex.code(),
            double_side: self.double_sided,
            font_embed: self.font_embedding,
            paper_source: self.paper_source.code(),
        }
    }

    /// Rebuilds settings from a persisted record.
    ///
    /// `profile` names the profile in error messages.
    ///
    /// ## Errors
    /// `PrintingError::InvalidRecord` for unknown enum codes, a copy count
    /// out of range or a non-positive paper size.
    pub fn from_record(profile: &str, record: &PrinterRecord) -> PrintingResult<Self> {
        fn decode<T>(
            profile: &str,
            field: &str,
            code: i32,
            from_code: fn(i32) -> Option<T>,
        ) -> PrintingResult<T> {
            from_code(code).ok_or_else(|| {
                PrintingError::invalid_record(profile, format!("unknown {field} code {code}"))
            })
        }

        let mode = decode(profile, "printer mode", record.printer_mode, PrinterMode::from_code)?;
        let mut settings = PrinterSettings::new(mode);

        settings.unit = decode(profile, "unit", record.unit, Unit::from_code)?;
        settings.set_resolution(record.resolution);

        let (w, h) = record.paper_size;
        if !(w > 0.0 && h > 0.0) {
            return Err(PrintingError::invalid_record(
                profile,
                format!("paper size {w}x{h} is not positive"),
            ));
        }
        settings.set_paper_size(record.paper_size, Unit::Millimeter);
        settings.set_page_margins(record.page_margins, Unit::Millimeter);

        settings.printer_name = record.name.clone();
        settings.orientation =
            decode(profile, "orientation", record.orientation, Orientation::from_code)?;
        settings.full_page = record.full_page;
        settings
            .set_copy_count(record.copy_count)
            .map_err(|e| PrintingError::invalid_record(profile, e.to_string()))?;
        settings.output_format = decode(
            profile,
            "output format",
            record.output_format,
            OutputFormat::from_code,
        )?;
        settings.output_filename = record.output_filename.clone();
        settings.print_range =
            decode(profile, "print range", record.print_range, PrintRange::from_code)?;
        settings.from_page = record.print_from;
        settings.to_page = record.print_to;
        settings.color_mode = decode(profile, "color mode", record.color_mode, ColorMode::from_code)?;
        settings.page_order = decode(profile, "page order", record.page_order, PageOrder::from_code)?;
        settings.duplex = decode(profile, "duplex", record.duplex, DuplexMode::from_code)?;
        settings.double_sided = record.double_side;
        settings.font_embedding = record.font_embed;
        settings.paper_source = decode(
            profile,
            "paper source",
            record.paper_source,
            PaperSource::from_code,
        )?;

        Ok(settings)
    }

    /// One `label: value` line per setting, for read-only display.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let (w, h) = self.paper_size(self.unit);
        let [l, t, r, b] = self.page_margins(self.unit);
        vec![
            ("Printer", self.printer_name.clone()),
            ("Unit", self.unit.display_name().to_string()),
            ("Orientation", self.orientation.display_name().to_string()),
            ("Paper size", format!("{w:.2} x {h:.2}")),
            ("Resolution", format!("{} dpi", self.resolution)),
            ("Full page", self.full_page.to_string()),
            ("Copies", self.copy_count.to_string()),
            ("Output format", self.output_format.display_name().to_string()),
            ("Output file", self.output_filename.clone()),
            ("Print range", self.print_range.display_name().to_string()),
            ("Pages", format!("{} - {}", self.from_page, self.to_page)),
            ("Printer mode", self.printer_mode.display_name().to_string()),
            ("Color mode", self.color_mode.display_name().to_string()),
            ("Page order", self.page_order.display_name().to_string()),
            ("Margins", format!("{l:.2}, {t:.2}, {r:.2}, {b:.2}")),
            ("Duplex", self.duplex.display_name().to_string()),
            ("Double sided", self.double_sided.to_string()),
            ("Embed fonts", self.font_embedding.to_string()),
            ("Paper source", self.paper_source.display_name().to_string()),
        ]
    }
}

// =============================================================================
// Printer Record
// =============================================================================

/// Persisted form of [`PrinterSettings`] (`printing.p.<name>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PrinterRecord {
    pub name: String,
    pub unit: i32,
    pub orientation: i32,
    pub paper_size: (f64, f64),
    pub resolution: i32,
    pub full_page: bool,
    pub copy_count: i32,
    pub output_format: i32,
    pub output_filename: String,
    pub print_range: i32,
    pub print_from: i32,
    pub print_to: i32,
    pub printer_mode: i32,
    pub color_mode: i32,
    pub page_order: i32,
    pub page_margins: [f64; 4],
    pub duplex: i32,
    pub double_side: bool,
    pub font_embed: bool,
    pub paper_source: i32,
}

/// A named printer profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Printer {
    pub name: String,
    pub settings: PrinterSettings,
}

impl Printer {
    pub fn new(name: impl Into<String>, settings: PrinterSettings) -> Self {
        Printer {
            name: name.into(),
            settings,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
