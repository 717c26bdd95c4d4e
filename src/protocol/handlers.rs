//! Command handlers module for pagefs-server.
//!
//! Runs a parsed command against the object service and renders the
//! response line. Handlers are synchronous; the session layer moves them
//! off the async runtime.

use log::{info, warn};

use crate::error::{ObjectError, handle_error};
use crate::protocol::responses::{
    BAD_REQUEST, CLOSING, CREATED, NO_CONTENT, NOT_IMPLEMENTED, OK, error_response,
    format_response, json_response, object_error_response,
};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::service::ObjectService;
use crate::storage::ObjectRequest;

/// Dispatches a received command to its corresponding handler.
pub fn handle_command(service: &ObjectService, command: &Command) -> CommandResult {
    match command {
        Command::Browse {
            path,
            max_depth,
            published_pages,
        } => handle_cmd_browse(service, path, *max_depth, *published_pages),
        Command::Get(path) => handle_cmd_get(service, path),
        Command::Put { path, request } => handle_cmd_put(service, path, request),
        Command::Delete(path) => handle_cmd_delete(service, path),
        Command::Publish(path) => handle_cmd_publish(service, path),
        Command::Unpublish(path) => handle_cmd_unpublish(service, path),
        Command::Quit => CommandResult {
            status: CommandStatus::CloseConnection,
            message: Some(format_response(CLOSING)),
        },
        Command::Invalid(reason) => {
            warn!("Rejected malformed command: {reason}");
            CommandResult {
                status: CommandStatus::Failure(reason.clone()),
                message: Some(error_response(BAD_REQUEST, "invalid_command", reason)),
            }
        }
        Command::Unknown(raw) => CommandResult {
            status: CommandStatus::Failure(format!("unknown command {raw:?}")),
            message: Some(error_response(
                NOT_IMPLEMENTED,
                "unknown_command",
                "command not implemented",
            )),
        },
    }
}

fn handle_cmd_browse(
    service: &ObjectService,
    path: &str,
    max_depth: u32,
    published_pages: bool,
) -> CommandResult {
    match service.browse(path, max_depth, published_pages) {
        Ok(objects) => success(json_response(OK, &objects)),
        Err(e) => failure("browse", &e),
    }
}

fn handle_cmd_get(service: &ObjectService, path: &str) -> CommandResult {
    match service.get_object(path) {
        Ok(object) => success(json_response(OK, &object)),
        Err(e) => failure("get object", &e),
    }
}

fn handle_cmd_put(
    service: &ObjectService,
    path: &str,
    request: &ObjectRequest,
) -> CommandResult {
    match service.put_object(path, request) {
        Ok(object) => {
            info!("Stored {:?} object at {path}", request.object_type);
            success(json_response(CREATED, &object))
        }
        Err(e) => failure("put object", &e),
    }
}

fn handle_cmd_delete(service: &ObjectService, path: &str) -> CommandResult {
    match service.delete_object(path) {
        Ok(()) => success(format_response(NO_CONTENT)),
        Err(e) => failure("delete object", &e),
    }
}

fn handle_cmd_publish(service: &ObjectService, path: &str) -> CommandResult {
    match service.publish_page(path) {
        Ok(()) => success(format_response(OK)),
        Err(e) => failure("publish page", &e),
    }
}

fn handle_cmd_unpublish(service: &ObjectService, path: &str) -> CommandResult {
    match service.unpublish_page(path) {
        Ok(()) => success(format_response(OK)),
        Err(e) => failure("unpublish page", &e),
    }
}

fn success(message: String) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(message),
    }
}

fn failure(operation: &str, err: &ObjectError) -> CommandResult {
    handle_error(operation, err);
    CommandResult {
        status: CommandStatus::Failure(err.to_string()),
        message: Some(object_error_response(err)),
    }
}
