//! # Rotating file handler factory

use logwire::handler::RotatingFileHandler;
use logwire::Level;

use crate::handler::{decorate, file_permission};
use crate::plugin_manager::HandlerFactory;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`RotatingFileHandler`]s.
#[derive(Debug)]
pub struct RotatingFileHandlerFactory {}

impl RotatingFileHandlerFactory {
    /// Creates a new RotatingFileHandlerFactory
    pub fn new() -> Self {
        RotatingFileHandlerFactory {}
    }
}

impl Default for RotatingFileHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for RotatingFileHandlerFactory {
    type Handler = RotatingFileHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<RotatingFileHandler> {
        let reader = OptionsReader::required(options)?;
        let mut handler = RotatingFileHandler::new(
            reader.required_string("filename")?,
            reader.usize("max_files", 0)?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        if let Some(mode) = file_permission(&reader)? {
            handler = handler.with_file_permission(mode);
        }

        let filename_format = reader.string("filename_format")?;
        let date_format = reader.string("date_format")?;
        if filename_format.is_some() || date_format.is_some() {
            let filename_format =
                filename_format.unwrap_or_else(|| handler.filename_format().to_owned());
            let date_format = date_format.unwrap_or_else(|| handler.date_format().to_owned());
            handler.set_filename_format(&filename_format, &date_format)?;
        }

        decorate(handler, container, &reader)
    }
}
