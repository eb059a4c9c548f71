pub mod factory;
pub mod files;
pub mod html_exporter;
pub mod renderer;
pub mod wkhtmltopdf_exporter;

pub use factory::create_exporter;
pub use html_exporter::HtmlFileExporter;
pub use renderer::HtmlRenderer;
pub use wkhtmltopdf_exporter::WkHtmlToPdfExporter;
