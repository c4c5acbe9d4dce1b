mod direct;
mod form;
mod session;

use indoc::indoc;

/// Every client type, with one user and one token to authenticate as.
const CONFIG: &str = indoc! {r#"
    [auth]
    enabled = true

    [[auth.clients]]
    type = "parameter"

    [[auth.clients]]
    type = "header"

    [[auth.clients]]
    type = "basic"
    realm = "trellis"

    [[auth.clients]]
    type = "form"

    [[auth.users]]
    username = "jane"
    password = "s3cret"
    id = "user-1"
    attributes = { email = "jane@example.com" }

    [[auth.tokens]]
    token = "abc"
    id = "123"
"#};
