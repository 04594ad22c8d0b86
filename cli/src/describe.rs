#![deny(missing_docs)]

//! # Describe Command
//!
//! Parses handler sources and prints the inferred operations as a `paths` map.

use crate::error::{CliError, CliResult};
use indexmap::IndexMap;
use opinfer_core::{
    parse_handlers, DescribeOptions, EndpointDescriptor, OperationGenerator,
    RustTypeSchemaResolver,
};
use std::fs;
use std::path::{Path, PathBuf};
use utoipa::openapi::path::Operation as OpenApiOperation;
use walkdir::WalkDir;

/// Arguments for the describe command.
#[derive(clap::Args, Debug, Clone)]
pub struct DescribeArgs {
    /// Rust source file, or a directory searched recursively for `.rs` files.
    #[clap(long, env = "OPINFER_SOURCE")]
    pub source: PathBuf,

    /// YAML options file (application name, default error type, services).
    #[clap(long, env = "OPINFER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Application name used as the fallback tag. Overrides the options file.
    #[clap(long, env = "OPINFER_APP_NAME")]
    pub app_name: Option<String>,

    /// Output path. Supports .json and .yaml/.yml extensions.
    /// If not provided, prints JSON to stdout.
    #[clap(long)]
    pub output: Option<PathBuf>,
}

/// Route -> lower-case method -> operation.
pub type PathsMap = IndexMap<String, IndexMap<String, OpenApiOperation>>;

/// Executes the describe command.
pub fn execute(args: &DescribeArgs) -> CliResult<()> {
    let mut options = match &args.config {
        Some(path) => DescribeOptions::load(path)?,
        None => DescribeOptions::default(),
    };
    if let Some(name) = &args.app_name {
        options.application_name = Some(name.clone());
    }

    let endpoints = collect_endpoints(&args.source)?;
    tracing::info!(count = endpoints.len(), "parsed routed handlers");

    let paths = describe_paths(&options, &endpoints)?;
    let document = serde_json::json!({ "paths": paths });

    let format = args
        .output
        .as_ref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .unwrap_or("json");
    let output_str = match format {
        "yaml" | "yml" => serde_yaml::to_string(&document)
            .map_err(|e| CliError::General(format!("YAML serialization failed: {}", e)))?,
        _ => serde_json::to_string_pretty(&document)
            .map_err(|e| CliError::General(format!("JSON serialization failed: {}", e)))?,
    };

    match &args.output {
        Some(out_path) => {
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(out_path, output_str)?;
            println!("Operations written to {:?}", out_path);
        }
        None => println!("{}", output_str),
    }

    Ok(())
}

/// Parses every `.rs` file under `source`, in path order.
pub fn collect_endpoints(source: &Path) -> CliResult<Vec<EndpointDescriptor>> {
    if !source.exists() {
        return Err(CliError::General(format!(
            "Source path not found: {:?}",
            source
        )));
    }

    let mut endpoints = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }

        let code = fs::read_to_string(path)?;
        let found = parse_handlers(&code)?;
        tracing::debug!(file = %path.display(), handlers = found.len(), "parsed source file");
        endpoints.extend(found);
    }

    Ok(endpoints)
}

/// Describes endpoints and groups the operations by route and method.
///
/// The first endpoint registered for a route/method pair wins.
pub fn describe_paths(
    options: &DescribeOptions,
    endpoints: &[EndpointDescriptor],
) -> CliResult<PathsMap> {
    let cache = options.capability_cache();
    let services = options.service_registry();
    let generator = OperationGenerator::new(options, &RustTypeSchemaResolver, &services, &cache)?;

    let mut paths = PathsMap::new();
    for (endpoint, operation) in endpoints.iter().zip(generator.describe_all(endpoints)?) {
        let (Some(operation), Some(method)) = (operation, endpoint.single_method()) else {
            continue;
        };

        let methods = paths.entry(endpoint.route.as_str().to_string()).or_default();
        let key = method.as_str().to_ascii_lowercase();
        if methods.contains_key(&key) {
            tracing::warn!(
                route = endpoint.route.as_str(),
                method = %method,
                handler = %endpoint.signature.name,
                "route already described, skipping handler"
            );
            continue;
        }
        methods.insert(key, operation.to_openapi());
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const HANDLERS: &str = r#"
        use actix_web::{get, post, web, HttpResponse};

        /// Lists items.
        #[get("/items")]
        async fn list_items(page: web::Query<u32>) -> web::Json<Vec<Item>> { todo!() }

        #[post("/items")]
        async fn create_item(item: web::Json<Item>) -> HttpResponse { todo!() }

        #[get("/items/{id}")]
        async fn get_item(id: web::Path<i64>) -> web::Json<Item> { todo!() }
    "#;

    fn write_file(path: &Path, content: &str) {
        fs::File::create(path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_describe_directory_to_json() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        write_file(&src.join("nested").join("items.rs"), HANDLERS);
        write_file(&src.join("notes.txt"), "#[get(\"/ignored\")] fn x() {}");

        let out_path = dir.path().join("out").join("paths.json");
        let args = DescribeArgs {
            source: src,
            config: None,
            app_name: Some("inventory".into()),
            output: Some(out_path.clone()),
        };
        execute(&args).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
        let paths = json["paths"].as_object().unwrap();
        assert_eq!(
            paths.keys().collect::<Vec<_>>(),
            vec!["/items", "/items/{id}"]
        );
        assert_eq!(json["paths"]["/items"]["get"]["summary"], "Lists items.");
        assert_eq!(json["paths"]["/items"]["get"]["tags"][0], "inventory");
        assert_eq!(
            json["paths"]["/items"]["get"]["parameters"][0]["in"],
            "query"
        );
        assert!(json["paths"]["/items"]["post"]["requestBody"].is_object());
        assert_eq!(
            json["paths"]["/items/{id}"]["get"]["parameters"][0]["in"],
            "path"
        );
    }

    #[test]
    fn test_describe_file_to_yaml_with_options() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("handlers.rs");
        write_file(
            &src,
            r#"
            #[get("/items/{id}")]
            #[response_provider(status = 404)]
            async fn get_item(id: web::Path<i64>) -> web::Json<Item> { todo!() }
            "#,
        );
        let config = dir.path().join("opinfer.yaml");
        write_file(&config, "default_error_type: ProblemDetails\n");

        let out_path = dir.path().join("paths.yaml");
        let args = DescribeArgs {
            source: src,
            config: Some(config),
            app_name: None,
            output: Some(out_path.clone()),
        };
        execute(&args).unwrap();

        let yaml = fs::read_to_string(&out_path).unwrap();
        assert!(yaml.contains("/items/{id}"));
        assert!(yaml.contains("#/components/schemas/ProblemDetails"));
    }

    #[test]
    fn test_duplicate_route_keeps_first() {
        let code = r#"
            #[get("/ping")]
            async fn first() -> String { todo!() }

            #[get("/ping")]
            #[oai(operation_id = "second")]
            async fn second() -> String { todo!() }
        "#;
        let endpoints = parse_handlers(code).unwrap();
        let paths = describe_paths(&DescribeOptions::default(), &endpoints).unwrap();
        assert_eq!(paths["/ping"].len(), 1);
        assert_eq!(paths["/ping"]["get"].operation_id, None);
    }

    #[test]
    fn test_missing_source() {
        let dir = tempdir().unwrap();
        let result = collect_endpoints(&dir.path().join("missing"));
        assert!(matches!(result, Err(CliError::General(_))));
    }
}
