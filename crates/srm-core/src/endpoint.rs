//! Endpoint contract: action vocabulary and request encoding.
//!
//! The remote side is a single cloud-function URL. Reads are GETs selected by
//! an `action` query parameter; writes are POSTs carrying `{action, id?,
//! <fields>}` as JSON or form-encoded data, depending on the deployment.
//! Requests carry no authentication token; the URL is the only access
//! control.

use crate::config::{VocabularyPreset, WriteEncoding};
use url::Url;

/// Wire names of the actions a deployment understands.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub list: &'static str,
    pub headers: &'static str,
    pub get_by_id: &'static str,
    pub add: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

impl Vocabulary {
    pub fn from_preset(preset: VocabularyPreset) -> Self {
        match preset {
            VocabularyPreset::Data => Self {
                list: "getData",
                headers: "getHeaders",
                get_by_id: "getDataById",
                add: "addData",
                update: "updateData",
                delete: "deleteData",
            },
            VocabularyPreset::Users => Self {
                list: "getUsers",
                headers: "getHeaders",
                get_by_id: "getUserById",
                add: "addUser",
                update: "updateUser",
                delete: "deleteUser",
            },
        }
    }
}

/// Read request against the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Read {
    List,
    Headers,
    ById(String),
}

/// Write request against the endpoint. Deletes carry only the id; adds may
/// omit the id when the server assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Add {
        id: Option<String>,
        fields: Vec<(String, String)>,
    },
    Update {
        id: String,
        fields: Vec<(String, String)>,
    },
    Delete {
        id: String,
    },
}

/// Build the GET URL for a read action.
pub fn read_url(endpoint: &Url, vocab: &Vocabulary, read: &Read) -> Url {
    let mut url = endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        match read {
            Read::List => {
                pairs.append_pair("action", vocab.list);
            }
            Read::Headers => {
                pairs.append_pair("action", vocab.headers);
            }
            Read::ById(id) => {
                pairs.append_pair("action", vocab.get_by_id);
                pairs.append_pair("id", id);
            }
        }
    }
    url
}

/// Encoded POST body plus its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBody {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Encode a write action for submission.
pub fn write_body(vocab: &Vocabulary, write: &Write, encoding: WriteEncoding) -> WriteBody {
    let (action, id, fields) = match write {
        Write::Add { id, fields } => (vocab.add, id.as_deref(), fields.as_slice()),
        Write::Update { id, fields } => (vocab.update, Some(id.as_str()), fields.as_slice()),
        Write::Delete { id } => (vocab.delete, Some(id.as_str()), &[][..]),
    };

    match encoding {
        WriteEncoding::Json => {
            let mut map = serde_json::Map::new();
            map.insert("action".to_string(), action.into());
            if let Some(id) = id {
                map.insert("id".to_string(), id.into());
            }
            for (name, value) in fields {
                map.insert(name.clone(), value.clone().into());
            }
            WriteBody {
                content_type: "application/json",
                body: serde_json::Value::Object(map).to_string().into_bytes(),
            }
        }
        WriteEncoding::Form => {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            form.append_pair("action", action);
            if let Some(id) = id {
                form.append_pair("id", id);
            }
            for (name, value) in fields {
                form.append_pair(name, value);
            }
            WriteBody {
                content_type: "application/x-www-form-urlencoded",
                body: form.finish().into_bytes(),
            }
        }
    }
}
