//! Proptest generators for property-based testing.

use proptest::prelude::*;

use tidemark_core::{
    author_keypair_from, AuthorKeypair, Document, DocumentBuilder, Keypair, PublicKey,
};

/// Generate a keypair from a random seed.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key (not necessarily on the curve; useful
/// for address/text plumbing, not for verification).
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    any::<[u8; 32]>().prop_map(PublicKey::from_bytes)
}

/// Generate a valid four-letter shortname.
pub fn shortname() -> impl Strategy<Value = String> {
    "[a-z]{4}".prop_map(String::from)
}

/// Generate an author keypair with a random shortname and seed.
pub fn author_keypair() -> impl Strategy<Value = AuthorKeypair> {
    (shortname(), any::<[u8; 32]>()).prop_map(|(name, seed)| {
        author_keypair_from(&name, &Keypair::from_seed(&seed))
            .expect("generated shortname is valid")
    })
}

/// Generate a slash-led document path with one to four segments.
pub fn path() -> impl Strategy<Value = String> {
    "(/[a-z0-9]{1,12}){1,4}".prop_map(String::from)
}

/// Generate text-safe content, including multi-byte characters.
pub fn content(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('a', 'z'),
            proptest::char::range('0', '9'),
            Just(' '),
            Just('\u{2603}'),
        ],
        0..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Generate a reasonable microsecond timestamp.
pub fn timestamp() -> impl Strategy<Value = u64> {
    1u64..=3_000_000_000_000_000
}

/// Parameters for generating a signed document.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub seed: [u8; 32],
    pub shortname: String,
    pub path: String,
    pub content: String,
    pub timestamp: u64,
    pub delete_after: Option<u64>,
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            shortname(),
            path(),
            content(64),
            timestamp(),
            proptest::option::of(timestamp()),
        )
            .prop_map(
                |(seed, shortname, path, content, timestamp, delete_after)| DocumentParams {
                    seed,
                    shortname,
                    path,
                    content,
                    timestamp,
                    delete_after,
                },
            )
            .boxed()
    }
}

/// Build and sign a document from parameters.
pub fn document_from_params(params: &DocumentParams) -> Document {
    let author = author_keypair_from(&params.shortname, &Keypair::from_seed(&params.seed))
        .expect("generated shortname is valid");

    let mut builder = DocumentBuilder::new(params.path.clone())
        .content(params.content.clone())
        .timestamp(params.timestamp);
    if let Some(at) = params.delete_after {
        builder = builder.delete_after(at);
    }

    builder.sign(&author).expect("generated path is valid")
}
