use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::executor::block_on;
use futures::stream::{self, StreamExt};
use html_stream::{
    attributes, create_element, escape_html_content, serialize_tokens, AttributeValue, Child,
    HtmlStream, HtmlToken, SerializerConfig,
};

fn build_list(items: usize) -> HtmlStream {
    let children = (0..items)
        .map(|i| {
            create_element(
                "li",
                Some(attributes! { "data-index" => i.to_string() }),
                vec![format!("Item {} & more", i).into()],
            )
            .map(Child::from)
        })
        .collect::<html_stream::Result<Vec<_>>>()
        .unwrap();
    create_element("ul", Some(attributes! { "class" => "list" }), children).unwrap()
}

fn bench_escaping(c: &mut Criterion) {
    let plain = "The quick brown fox jumps over the lazy dog".repeat(20);
    let special = r#"<script>alert("x" && 'y')</script>"#.repeat(20);

    let mut group = c.benchmark_group("escaping");

    group.bench_function("no_special_characters", |b| {
        b.iter(|| escape_html_content(black_box(&plain)).len())
    });

    group.bench_function("special_characters", |b| {
        b.iter(|| escape_html_content(black_box(&special)).len())
    });

    group.finish();
}

fn bench_element_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("element_scale");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| block_on(build_list(black_box(size)).into_string()).unwrap())
        });
    }

    group.finish();
}

fn bench_deferred_content(c: &mut Criterion) {
    c.bench_function("deferred_children_and_attributes", |b| {
        b.iter(|| {
            let children = (0..100)
                .map(|i| Child::deferred(async move { Ok(format!("chunk {}", i)) }))
                .collect();
            let element = create_element(
                "div",
                Some(attributes! {
                    "title" => AttributeValue::deferred(async { Ok("deferred") }),
                    "data-text" => AttributeValue::chunks(stream::iter(["a", "b", "c"]).map(Ok)),
                }),
                children,
            )
            .unwrap();
            block_on(element.into_string()).unwrap()
        })
    });
}

fn bench_token_serialization(c: &mut Criterion) {
    let tokens: Vec<HtmlToken> = (0..500)
        .flat_map(|i| {
            [
                HtmlToken::start("span"),
                HtmlToken::attribute("id", format!("s{}", i)),
                HtmlToken::EndOfOpeningTag,
                HtmlToken::text("<text>"),
                HtmlToken::ClosingTag,
            ]
        })
        .collect();

    c.bench_function("serialize_tokens", |b| {
        b.iter(|| {
            let stream = stream::iter(tokens.clone().into_iter().map(Ok)).boxed();
            block_on(serialize_tokens(stream, &SerializerConfig::default()).into_string())
                .unwrap()
        })
    });
}

criterion_group!(
    streaming_benches,
    bench_escaping,
    bench_element_scale,
    bench_deferred_content,
    bench_token_serialization
);

criterion_main!(streaming_benches);
