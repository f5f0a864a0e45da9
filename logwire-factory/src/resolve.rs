//! # Dependency resolution
//!
//! Options refer to other objects in one of four ways:
//!
//! - an [`Instance`](crate::Instance) holding the object itself,
//! - a string naming a service in the [`ServiceContainer`],
//! - a map `{type, options, enabled}` built through a plugin manager,
//! - for collections, a list (or map) of the above.
//!
//! The functions here turn those references into objects and report shape
//! errors naming the offending option.

use std::any::Any;
use std::sync::Arc;

use logwire::handler::{ActivationStrategy, ErrorLevelActivationStrategy, MailMessage};
use logwire::{FormattableHandler, Formatter, Handler, ProcessableHandler, Processor};

use crate::options::parse_level;
use crate::plugin_manager::PluginManager;
use crate::{FactoryError, FactoryResult, OptionsReader, ServiceContainer, Value};

/// A `{type, options, enabled}` entry.
struct PluginSpec<'a> {
    name: &'a str,
    options: Option<&'a Value>,
    enabled: bool,
}

fn plugin_spec<'a>(entry: &'a Value, kind: &str) -> FactoryResult<PluginSpec<'a>> {
    let Some(map) = entry.as_map() else {
        return Err(FactoryError::not_created(format!(
            "Options for the {kind} must be an Array"
        )));
    };
    let name = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            FactoryError::not_created(format!("Options must contain a type for the {kind}"))
        })?;
    let options = map.get("options").filter(|value| !value.is_null());
    if let Some(options) = options {
        if options.as_map().is_none() {
            return Err(FactoryError::not_created(format!(
                "Options for the {kind} \"{name}\" must be an Array"
            )));
        }
    }
    let enabled = match map.get("enabled") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(enabled)) => *enabled,
        Some(_) => {
            return Err(FactoryError::not_created(format!(
                "enabled for the {kind} \"{name}\" must be a Boolean"
            )))
        }
    };
    Ok(PluginSpec {
        name,
        options,
        enabled,
    })
}

fn build_spec<T: ?Sized + 'static>(
    container: &ServiceContainer,
    manager: &PluginManager<T>,
    spec: &PluginSpec<'_>,
) -> FactoryResult<Arc<T>> {
    let built = match spec.options {
        Some(options) => manager.build(container, spec.name, Some(options)),
        None => manager.get(container, spec.name),
    };
    built.map_err(|err| match err {
        FactoryError::NotFound { name, .. } if name == spec.name => FactoryError::not_found(
            name,
            format!("Could not load {} \"{}\"", manager.kind(), spec.name),
        ),
        other => other,
    })
}

fn resolve_collection<T: ?Sized + 'static>(
    container: &ServiceContainer,
    value: &Value,
    manager: &PluginManager<T>,
    label: &str,
) -> FactoryResult<Vec<Arc<T>>> {
    let entries: Vec<&Value> = match value {
        Value::List(items) => items.iter().collect(),
        Value::Map(map) => map.values().collect(),
        _ => {
            return Err(FactoryError::not_created(format!("{label} must be an Array")));
        }
    };

    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Value::Instance(instance) = entry {
            let object = instance.downcast::<Arc<T>>().ok_or_else(|| {
                FactoryError::not_created(format!(
                    "{label} must contain {} instances, got {}",
                    manager.kind(),
                    instance.type_name()
                ))
            })?;
            resolved.push(object);
            continue;
        }
        let spec = plugin_spec(entry, manager.kind())?;
        if !spec.enabled {
            logwire::logwire_debug!(
                name: "Resolve.EntrySkipped",
                kind = manager.kind(),
                plugin = spec.name
            );
            continue;
        }
        resolved.push(build_spec(container, manager, &spec)?);
    }
    Ok(resolved)
}

/// Resolves a list (or map) of handler entries, skipping disabled ones.
pub fn resolve_handlers(
    container: &ServiceContainer,
    value: &Value,
) -> FactoryResult<Vec<Arc<dyn Handler>>> {
    let manager = container.handler_manager()?;
    resolve_collection(container, value, &manager, "Handlers")
}

/// Resolves a list (or map) of processor entries, skipping disabled ones.
pub fn resolve_processors(
    container: &ServiceContainer,
    value: &Value,
) -> FactoryResult<Vec<Arc<dyn Processor>>> {
    let manager = container.processor_manager()?;
    resolve_collection(container, value, &manager, "Processors")
}

/// Resolves a service given as an instance or a container service name.
///
/// `option` and `expected` name the option and the expected type in errors.
pub fn resolve_service<T: Any + Clone>(
    container: &ServiceContainer,
    value: &Value,
    option: &str,
    expected: &'static str,
) -> FactoryResult<T> {
    match value {
        Value::Instance(instance) => instance.downcast::<T>().ok_or_else(|| {
            FactoryError::not_created(format!(
                "{option} must be an instance of {expected}, got {}",
                instance.type_name()
            ))
        }),
        Value::String(name) => {
            if !container.has(name) {
                return Err(FactoryError::not_found(
                    name.clone(),
                    format!("No {option} service \"{name}\" found"),
                ));
            }
            let instance = container.get(name)?;
            instance.downcast::<T>().ok_or_else(|| {
                FactoryError::not_created(format!(
                    "{option} service \"{name}\" must be an instance of {expected}, got {}",
                    instance.type_name()
                ))
            })
        }
        other => Err(FactoryError::not_created(format!(
            "{option} must be a service name or an instance of {expected}, got {}",
            other.kind()
        ))),
    }
}

/// Resolves a single wrapped handler.
///
/// A disabled map entry is an error: the wrapper needs a handler.
pub fn resolve_handler(
    container: &ServiceContainer,
    value: &Value,
    option: &str,
) -> FactoryResult<Arc<dyn Handler>> {
    match value {
        Value::Map(_) => {
            let manager = container.handler_manager()?;
            let spec = plugin_spec(value, manager.kind())?;
            if !spec.enabled {
                return Err(FactoryError::not_created("No active handler specified"));
            }
            build_spec(container, &manager, &spec)
        }
        other => resolve_service::<Arc<dyn Handler>>(container, other, option, "Handler"),
    }
}

/// Resolves an optional formatter.
///
/// `null` and disabled map entries yield `None`. Booleans and other scalars
/// are rejected.
pub fn resolve_formatter(
    container: &ServiceContainer,
    value: &Value,
) -> FactoryResult<Option<Arc<dyn Formatter>>> {
    match value {
        Value::Null => Ok(None),
        Value::Map(_) => {
            let manager = container.formatter_manager()?;
            let spec = plugin_spec(value, manager.kind())?;
            if !spec.enabled {
                return Ok(None);
            }
            build_spec(container, &manager, &spec).map(Some)
        }
        Value::Instance(_) | Value::String(_) => {
            resolve_service::<Arc<dyn Formatter>>(container, value, "formatter", "Formatter")
                .map(Some)
        }
        other => Err(FactoryError::not_created(format!(
            "formatter must be an Array, a service name or an instance of Formatter, got {}",
            other.kind()
        ))),
    }
}

/// Resolves a `fingers_crossed` activation strategy: a level, an instance, a
/// service name or a `{type, options}` map.
pub fn resolve_activation_strategy(
    container: &ServiceContainer,
    value: &Value,
) -> FactoryResult<Arc<dyn ActivationStrategy>> {
    match value {
        Value::Int(_) => Ok(Arc::new(ErrorLevelActivationStrategy::new(parse_level(
            "activation_strategy",
            value,
        )?))),
        Value::String(name) => match name.parse() {
            Ok(level) => Ok(Arc::new(ErrorLevelActivationStrategy::new(level))),
            Err(_) => resolve_service::<Arc<dyn ActivationStrategy>>(
                container,
                value,
                "activation_strategy",
                "ActivationStrategy",
            ),
        },
        Value::Map(_) => {
            let manager = container.activation_strategy_manager()?;
            let spec = plugin_spec(value, manager.kind())?;
            build_spec(container, &manager, &spec)
        }
        other => resolve_service::<Arc<dyn ActivationStrategy>>(
            container,
            other,
            "activation_strategy",
            "ActivationStrategy",
        ),
    }
}

/// Resolves a mail message template: an instance, a service name or a map
/// with `from`, `to`, `subject` and optionally `content_type`.
pub fn resolve_mail_message(
    container: &ServiceContainer,
    value: &Value,
) -> FactoryResult<MailMessage> {
    match value {
        Value::Map(_) => {
            let reader = OptionsReader::required(Some(value))?;
            let mut message = MailMessage::new(
                reader.required_string("from")?,
                reader.strings("to")?,
                reader.string("subject")?.unwrap_or_default(),
            );
            if message.to.is_empty() {
                return Err(FactoryError::not_created("No to provided"));
            }
            if let Some(content_type) = reader.string("content_type")? {
                message.content_type = content_type;
            }
            Ok(message)
        }
        other => resolve_service::<MailMessage>(container, other, "message", "MailMessage"),
    }
}

/// Applies the `formatter` option, if any, to `handler`.
pub fn apply_formatter<H: FormattableHandler>(
    handler: &mut H,
    container: &ServiceContainer,
    reader: &OptionsReader<'_>,
) -> FactoryResult<()> {
    if let Some(value) = reader.get("formatter") {
        if let Some(formatter) = resolve_formatter(container, value)? {
            handler.set_formatter(formatter);
        }
    }
    Ok(())
}

/// Applies the `processors` option, if any, to `handler` so that they run in
/// configured order.
pub fn apply_processors<H: ProcessableHandler>(
    handler: &mut H,
    container: &ServiceContainer,
    reader: &OptionsReader<'_>,
) -> FactoryResult<()> {
    if let Some(value) = reader.get("processors") {
        for processor in resolve_processors(container, value)?.into_iter().rev() {
            handler.push_processor(processor);
        }
    }
    Ok(())
}
