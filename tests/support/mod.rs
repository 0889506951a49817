use run_cli::commands::CommonOptions;
use run_protobuf::{HeaderFields, HttpRequest, HttpResponse};
use std::path::Path;

pub fn options(dir: &Path, input: &str, output: &str) -> CommonOptions {
    CommonOptions {
        input: Some(dir.join(input)),
        output: Some(dir.join(output)),
    }
}

pub fn sample_request() -> HttpRequest {
    HttpRequest {
        body: b"name=run".to_vec(),
        method: "POST".into(),
        url: "http://localhost:8080/live/0b4f/greet".into(),
        endpoint_id: "0b4f".into(),
        env: [("GREETING".to_string(), "hello".to_string())]
            .into_iter()
            .collect(),
        header: [(
            "Content-Type".to_string(),
            HeaderFields::new(["application/x-www-form-urlencoded"]),
        )]
        .into_iter()
        .collect(),
        runtime: "go".into(),
        deployment_id: "5e2a".into(),
        id: "9a7b".into(),
    }
}

pub fn sample_response() -> HttpResponse {
    let mut response = sample_request().respond(200, "hello run");
    response.header.insert(
        "Set-Cookie".to_string(),
        HeaderFields::new(["a=1", "b=2", "a=1"]),
    );
    response
}
