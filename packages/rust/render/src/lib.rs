//! External rendering tools.
//!
//! Wraps the two black boxes the conversion relies on: `jupyter nbconvert`
//! for notebook → HTML, and Playwright's Chromium for HTML → PDF, including
//! the one-time playwright install when it is missing.

pub mod nbconvert;
pub mod pdf;
pub mod process;

pub use nbconvert::{convert_to_html, nbconvert_args};
pub use pdf::{PdfOptions, RenderOutcome, html_url, needs_install, playwright_pdf_args, render_pdf};
pub use process::{ToolCommand, ToolOutput};
