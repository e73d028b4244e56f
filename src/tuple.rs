//! Flattening repeated joins into flat tuples, up to six elements.
//!
//! `a.append(&b).append(&c)` nests as `((A, B), C)`; the `*_flat` variants
//! splice the new element into the existing tuple instead, so that
//! `a.append(&b).append_flat(&c)` resolves to `(A, B, C)`.

use crate::{Future, Payload};

/// A tuple that can grow by one element at the back.
pub trait TupleAppend<U> {
    type Output;

    fn push_back(self, value: U) -> Self::Output;
}

/// A tuple that can grow by one element at the front.
pub trait TuplePrepend<U> {
    type Output;

    fn push_front(self, value: U) -> Self::Output;
}

macro_rules! tuple_impls {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty,)+ U> TupleAppend<U> for ($($ty,)+) {
            type Output = ($($ty,)+ U);

            fn push_back(self, value: U) -> Self::Output {
                let ($($var,)+) = self;
                ($($var,)+ value)
            }
        }

        impl<$($ty,)+ U> TuplePrepend<U> for ($($ty,)+) {
            type Output = (U, $($ty,)+);

            fn push_front(self, value: U) -> Self::Output {
                let ($($var,)+) = self;
                (value, $($var,)+)
            }
        }
    };
}

tuple_impls!(A a, B b);
tuple_impls!(A a, B b, C c);
tuple_impls!(A a, B b, C c, D d);
tuple_impls!(A a, B b, C c, D d, G g);

impl<T: Payload, E: Payload> Future<T, E> {
    /// Joins `other` and appends its payload to this future's tuple.
    pub fn append_flat<U>(&self, other: &Future<U, E>) -> Future<<T as TupleAppend<U>>::Output, E>
    where
        U: Payload,
        T: TupleAppend<U>,
        <T as TupleAppend<U>>::Output: Payload,
    {
        self.append(other).map(|(tuple, value)| tuple.push_back(value))
    }

    /// Joins `other` and puts its payload in front of this future's tuple.
    pub fn prepend_flat<U>(&self, other: &Future<U, E>) -> Future<<T as TuplePrepend<U>>::Output, E>
    where
        U: Payload,
        T: TuplePrepend<U>,
        <T as TuplePrepend<U>>::Output: Payload,
    {
        self.prepend(other).map(|(value, tuple)| tuple.push_front(value))
    }

    pub fn append_value_flat<U>(&self, value: U) -> Future<<T as TupleAppend<U>>::Output, E>
    where
        U: Payload,
        T: TupleAppend<U>,
        <T as TupleAppend<U>>::Output: Payload,
    {
        self.map(move |tuple| tuple.push_back(value))
    }

    pub fn prepend_value_flat<U>(&self, value: U) -> Future<<T as TuplePrepend<U>>::Output, E>
    where
        U: Payload,
        T: TuplePrepend<U>,
        <T as TuplePrepend<U>>::Output: Payload,
    {
        self.map(move |tuple| tuple.push_front(value))
    }
}

pub fn join<A, B, E>(a: &Future<A, E>, b: &Future<B, E>) -> Future<(A, B), E>
where
    A: Payload,
    B: Payload,
    E: Payload,
{
    a.append(b)
}

pub fn join3<A, B, C, E>(
    a: &Future<A, E>,
    b: &Future<B, E>,
    c: &Future<C, E>,
) -> Future<(A, B, C), E>
where
    A: Payload,
    B: Payload,
    C: Payload,
    E: Payload,
{
    a.append(b).append_flat(c)
}

pub fn join4<A, B, C, D, E>(
    a: &Future<A, E>,
    b: &Future<B, E>,
    c: &Future<C, E>,
    d: &Future<D, E>,
) -> Future<(A, B, C, D), E>
where
    A: Payload,
    B: Payload,
    C: Payload,
    D: Payload,
    E: Payload,
{
    join3(a, b, c).append_flat(d)
}

pub fn join5<A, B, C, D, G, E>(
    a: &Future<A, E>,
    b: &Future<B, E>,
    c: &Future<C, E>,
    d: &Future<D, E>,
    g: &Future<G, E>,
) -> Future<(A, B, C, D, G), E>
where
    A: Payload,
    B: Payload,
    C: Payload,
    D: Payload,
    G: Payload,
    E: Payload,
{
    join4(a, b, c, d).append_flat(g)
}

pub fn join6<A, B, C, D, G, H, E>(
    a: &Future<A, E>,
    b: &Future<B, E>,
    c: &Future<C, E>,
    d: &Future<D, E>,
    g: &Future<G, E>,
    h: &Future<H, E>,
) -> Future<(A, B, C, D, G, H), E>
where
    A: Payload,
    B: Payload,
    C: Payload,
    D: Payload,
    G: Payload,
    H: Payload,
    E: Payload,
{
    join5(a, b, c, d, g).append_flat(h)
}
