macro_rules! cart_fragment {
    () => {
        r#"
fragment Cart on Cart {
  id
  checkoutUrl
  totalQuantity
  note
  attributes { key value }
  discountCodes { code applicable }
  cost {
    subtotalAmount { amount currencyCode }
    totalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
  }
  lines(first: 100) {
    nodes {
      id
      quantity
      merchandise {
        ... on ProductVariant {
          id
          title
          selectedOptions { name value }
          product { id title handle vendor }
          image { url altText width height }
          price { amount currencyCode }
          compareAtPrice { amount currencyCode }
        }
      }
      cost {
        totalAmount { amount currencyCode }
        amountPerQuantity { amount currencyCode }
        compareAtAmountPerQuantity { amount currencyCode }
      }
    }
  }
}
"#
    };
}

pub(crate) const CREATE_CART: &str = concat!(
    r#"
mutation createCart($lines: [CartLineInput!]) {
  cartCreate(input: { lines: $lines }) {
    cart { ...Cart }
    userErrors { field message }
  }
}
"#,
    cart_fragment!()
);

pub(crate) const GET_CART: &str = concat!(
    r#"
query getCart($cartId: ID!) {
  cart(id: $cartId) { ...Cart }
}
"#,
    cart_fragment!()
);

pub(crate) const ADD_TO_CART: &str = concat!(
    r#"
mutation addToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...Cart }
    userErrors { field message }
  }
}
"#,
    cart_fragment!()
);

pub(crate) const UPDATE_CART: &str = concat!(
    r#"
mutation updateCart($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...Cart }
    userErrors { field message }
  }
}
"#,
    cart_fragment!()
);

pub(crate) const REMOVE_FROM_CART: &str = concat!(
    r#"
mutation removeFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...Cart }
    userErrors { field message }
  }
}
"#,
    cart_fragment!()
);
