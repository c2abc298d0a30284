//! Demo method sets served by the `rpc-gateway` binary.

pub mod files;
pub mod hashing;
pub mod math;
pub mod random;
pub mod stats;
pub mod text;

use std::sync::Arc;
use std::time::Instant;

use crate::config::GatewayConfig;
use crate::protocol::MethodError;
use crate::registry::{MethodRegistry, MethodSpec, RegistryError};

use self::files::FileSandbox;
use self::stats::ConnectionCounter;

fn binary(name: &str, description: &str) -> MethodSpec {
    MethodSpec::new(name)
        .param("a", "number")
        .param("b", "number")
        .returns("number")
        .description(description)
}

fn string_to(name: &str, returns: &str, description: &str) -> MethodSpec {
    MethodSpec::new(name)
        .param("s", "string")
        .returns(returns)
        .description(description)
}

/// Registry with every demo method. `connections` is read by
/// `system.connections` and should also be wired into the gateway's
/// connect hook.
pub fn demo_registry(
    config: &GatewayConfig,
    connections: ConnectionCounter,
) -> Result<MethodRegistry, RegistryError> {
    let sandbox = Arc::new(FileSandbox::new(&config.files_root));
    let started = Instant::now();

    let builder = MethodRegistry::builder()
        // math
        .method(binary("math.add", "Add two numbers"), math::add)
        .method(binary("math.subtract", "Subtract b from a"), math::subtract)
        .method(binary("math.multiply", "Multiply two numbers"), math::multiply)
        .method(binary("math.divide", "Divide a by b"), math::divide)
        .raw_method(
            MethodSpec::new("math.sum")
                .param("numbers", "...number")
                .returns("number")
                .description("Sum any number of arguments"),
            math::sum,
        )
        .method(
            MethodSpec::new("math.fail")
                .param("message", "string?")
                .returns("never")
                .description("Always fails with the given message"),
            math::fail,
        )
        // text
        .method(string_to("text.uppercase", "string", "Uppercase a string"), text::uppercase)
        .method(string_to("text.lowercase", "string", "Lowercase a string"), text::lowercase)
        .method(string_to("text.reverse", "string", "Reverse the characters of a string"), text::reverse)
        .method(string_to("text.word_count", "number", "Count whitespace-separated words"), text::word_count)
        .method(
            string_to("text.stats", "{characters, words, lines, bytes}", "Character, word, line and byte counts"),
            text::stats,
        )
        .method(string_to("text.slugify", "string", "Build a URL slug"), text::slugify)
        // random
        .method(
            MethodSpec::new("random.uuid")
                .returns("string")
                .description("Random UUID v4"),
            random::uuid,
        )
        .method(
            MethodSpec::new("random.int")
                .param("min", "number")
                .param("max", "number")
                .returns("number")
                .description("Uniform integer between min and max inclusive"),
            random::int,
        )
        .method(
            MethodSpec::new("random.string")
                .param("length", "number")
                .returns("string")
                .description("Random alphanumeric string"),
            random::string,
        )
        // hashing
        .method(string_to("hash.sha256", "string", "SHA-256 hex digest"), hashing::sha256)
        .method(
            MethodSpec::new("hash.password")
                .param("password", "string")
                .returns("string")
                .description("Salted password hash"),
            hashing::password,
        )
        .method(
            MethodSpec::new("hash.verify")
                .param("password", "string")
                .param("stored", "string")
                .returns("boolean")
                .description("Check a password against a stored hash"),
            hashing::verify,
        );

    let read = Arc::clone(&sandbox);
    let write = Arc::clone(&sandbox);
    let list = Arc::clone(&sandbox);
    let delete = sandbox;

    builder
        // files
        .method(
            MethodSpec::new("files.read")
                .param("path", "string")
                .returns("string")
                .description("Read a UTF-8 file under the files root"),
            move |path: String| {
                let sandbox = Arc::clone(&read);
                async move { sandbox.read(&path).await }
            },
        )
        .method(
            MethodSpec::new("files.write")
                .param("path", "string")
                .param("contents", "string")
                .returns("number")
                .description("Write a file under the files root"),
            move |path: String, contents: String| {
                let sandbox = Arc::clone(&write);
                async move { sandbox.write(&path, &contents).await }
            },
        )
        .method(
            MethodSpec::new("files.list")
                .param("path", "string?")
                .returns("{name, is_dir, size}[]")
                .description("List a directory under the files root"),
            move |path: Option<String>| {
                let sandbox = Arc::clone(&list);
                async move { sandbox.list(path.as_deref()).await }
            },
        )
        .method(
            MethodSpec::new("files.delete")
                .param("path", "string")
                .returns("boolean")
                .description("Delete a file under the files root"),
            move |path: String| {
                let sandbox = Arc::clone(&delete);
                async move { sandbox.delete(&path).await }
            },
        )
        // system
        .method(
            MethodSpec::new("system.info")
                .returns("{name, version, time, uptime_secs}")
                .description("Server name, version, clock and uptime"),
            move || stats::info(started),
        )
        .method(
            MethodSpec::new("system.connections")
                .returns("number")
                .description("Number of accepted client connections"),
            move || {
                let count = connections.count();
                async move { Ok::<_, MethodError>(count) }
            },
        )
        .build()
}
