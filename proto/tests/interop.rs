//! Checks the table-driven codec against prost-generated messages for the
//! same schema (`proto/v1/types.proto`).

use anyhow::Result;
use pretty_assertions::assert_eq;
use prost::Message as _;
use run_protobuf::{HeaderFields, HttpRequest, HttpResponse, Message as _};
use std::collections::HashMap;

mod reference {
    use std::collections::HashMap;

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HttpRequest {
        #[prost(bytes = "vec", tag = "1")]
        pub body: Vec<u8>,
        #[prost(string, tag = "2")]
        pub method: String,
        #[prost(string, tag = "3")]
        pub url: String,
        #[prost(string, tag = "4")]
        pub endpoint_id: String,
        #[prost(map = "string, string", tag = "5")]
        pub env: HashMap<String, String>,
        #[prost(map = "string, message", tag = "6")]
        pub header: HashMap<String, HeaderFields>,
        #[prost(string, tag = "7")]
        pub runtime: String,
        #[prost(string, tag = "8")]
        pub deployment_id: String,
        #[prost(string, tag = "9")]
        pub id: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HeaderFields {
        #[prost(string, repeated, tag = "1")]
        pub fields: Vec<String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HttpResponse {
        #[prost(bytes = "vec", tag = "1")]
        pub body: Vec<u8>,
        #[prost(int32, tag = "2")]
        pub code: i32,
        #[prost(string, tag = "3")]
        pub request_id: String,
        #[prost(map = "string, message", tag = "4")]
        pub header: HashMap<String, HeaderFields>,
    }
}

fn to_reference_header(
    header: &HashMap<String, HeaderFields>,
) -> HashMap<String, reference::HeaderFields> {
    header
        .iter()
        .map(|(k, v)| {
            (
                k.clone(),
                reference::HeaderFields {
                    fields: v.fields.clone(),
                },
            )
        })
        .collect()
}

fn request() -> HttpRequest {
    HttpRequest {
        body: vec![0, 159, 146, 150, 255],
        method: "DELETE".into(),
        url: "http://localhost/preview/4f1c/api/items/7".into(),
        endpoint_id: "4f1c".into(),
        env: [("A", "1"), ("B", ""), ("", "empty key")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        header: [
            ("Cookie", HeaderFields::new(["a=1", "b=2", "a=1"])),
            ("X-Empty", HeaderFields::default()),
            ("X-Blank", HeaderFields::new([""])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        runtime: "go".into(),
        deployment_id: "9d2e".into(),
        id: "c0ffee".into(),
    }
}

#[test]
fn reference_decodes_our_requests() -> Result<()> {
    let ours = request();
    let theirs = reference::HttpRequest::decode(ours.encode_to_vec().as_slice())?;

    assert_eq!(theirs.body, ours.body);
    assert_eq!(theirs.method, ours.method);
    assert_eq!(theirs.url, ours.url);
    assert_eq!(theirs.endpoint_id, ours.endpoint_id);
    assert_eq!(theirs.env, ours.env);
    assert_eq!(theirs.header, to_reference_header(&ours.header));
    assert_eq!(theirs.runtime, ours.runtime);
    assert_eq!(theirs.deployment_id, ours.deployment_id);
    assert_eq!(theirs.id, ours.id);
    Ok(())
}

#[test]
fn we_decode_reference_requests() -> Result<()> {
    let expected = request();
    let theirs = reference::HttpRequest {
        body: expected.body.clone(),
        method: expected.method.clone(),
        url: expected.url.clone(),
        endpoint_id: expected.endpoint_id.clone(),
        env: expected.env.clone(),
        header: to_reference_header(&expected.header),
        runtime: expected.runtime.clone(),
        deployment_id: expected.deployment_id.clone(),
        id: expected.id.clone(),
    };

    let ours = HttpRequest::decode(&theirs.encode_to_vec())?;
    assert_eq!(ours, expected);
    Ok(())
}

#[test]
fn responses_interoperate() -> Result<()> {
    for code in [0, 200, 404, -1, i32::MIN, i32::MAX] {
        let ours = HttpResponse {
            body: b"body".to_vec(),
            code,
            request_id: "c0ffee".into(),
            header: [("Vary".to_string(), HeaderFields::new(["Accept", "Origin"]))]
                .into_iter()
                .collect(),
        };

        let theirs = reference::HttpResponse::decode(ours.encode_to_vec().as_slice())?;
        assert_eq!(theirs.code, code);
        assert_eq!(theirs.header, to_reference_header(&ours.header));

        assert_eq!(theirs.encoded_len(), ours.encoded_len());

        let back = HttpResponse::decode(&theirs.encode_to_vec())?;
        assert_eq!(back, ours);
    }
    Ok(())
}

#[test]
fn zero_value_response_is_empty_everywhere() -> Result<()> {
    let theirs = reference::HttpResponse::default();
    assert!(theirs.encode_to_vec().is_empty());
    assert!(HttpResponse::default().encode_to_vec().is_empty());
    assert_eq!(
        HttpResponse::decode(&theirs.encode_to_vec())?,
        HttpResponse::default()
    );
    Ok(())
}
