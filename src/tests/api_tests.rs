//! tests/api_tests.rs
//! Rutas REST de links, corridas de scraping y productos contra la app de actix.

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::tests::{product_data, test_config, test_services};

    const ML_URL: &str = "https://produto.mercadolivre.com.br/MLB-90-fone";

    fn complete_body(canonical: &str, title: &str) -> Value {
        json!({ "product": serde_json::to_value(product_data(canonical, title)).unwrap() })
    }

    #[actix_rt::test]
    async fn link_routes() {
        let (_pool, services) = test_services(&test_config(None, None)).await;
        let app = test_app!(services);

        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "url": ML_URL }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["marketplace"], "mercado_livre");
        assert_eq!(created["normalized_url"], ML_URL);
        let link_id = created["affiliate_link_id"].as_str().unwrap().to_string();

        // body sin `url`: lo rechaza el extractor JSON con el formato de la API
        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "href": ML_URL }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "url": "https://amazon.com.br/dp/1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/links?marketplace=mercado_livre&is_active=true")
            .to_request();
        let links: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(links.as_array().unwrap().len(), 1);
        assert_eq!(links[0]["id"], link_id.as_str());
        assert!(links[0]["product"].is_null());
        assert_eq!(links[0]["latest_scrape_run"]["status"], "queued");

        let req = test::TestRequest::get()
            .uri("/api/links?marketplace=amazon")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let req = test::TestRequest::post()
            .uri(&format!("/api/links/{}/scrape", link_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let rescrape: Value = test::read_body_json(resp).await;
        assert_eq!(rescrape["status"], "queued");

        let req = test::TestRequest::get()
            .uri(&format!("/api/links/{}", link_id))
            .to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["scrape_runs"].as_array().unwrap().len(), 2);
        assert_eq!(detail["scrape_runs"][0]["id"], rescrape["scrape_run_id"]);

        let req = test::TestRequest::get()
            .uri("/api/links/no-existe")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/links/no-existe/scrape")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn scrape_run_routes_follow_lifecycle() {
        let (_pool, services) = test_services(&test_config(None, None)).await;
        let app = test_app!(services);

        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "url": ML_URL }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let run_id = created["scrape_run_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/scrape-runs/{}/start", run_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let run: Value = test::read_body_json(resp).await;
        assert_eq!(run["status"], "running");

        let req = test::TestRequest::post()
            .uri(&format!("/api/scrape-runs/{}/start", run_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // producto sin `title`
        let req = test::TestRequest::post()
            .uri(&format!("/api/scrape-runs/{}/complete", run_id))
            .set_json(json!({ "product": { "marketplace": "mercado_livre" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/scrape-runs/{}/complete", run_id))
            .set_json(complete_body("MLB-90", "Fone Bluetooth"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let product: Value = test::read_body_json(resp).await;
        assert_eq!(product["title"], "Fone Bluetooth");
        let product_id = product["id"].as_str().unwrap().to_string();

        for action in ["complete", "fail"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/scrape-runs/{}/{}", run_id, action))
                .set_json(if action == "fail" {
                    json!({ "error": "tarde" })
                } else {
                    complete_body("MLB-90", "Fone Bluetooth")
                })
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CONFLICT, "{}", action);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
        }

        let req = test::TestRequest::post()
            .uri("/api/scrape-runs/no-existe/fail")
            .set_json(json!({ "error": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // el listado de links ahora trae el resumen del producto
        let req = test::TestRequest::get().uri("/api/links").to_request();
        let links: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(links[0]["product"]["id"], product_id.as_str());
        assert_eq!(links[0]["product"]["price_cents"], 12990);
        assert_eq!(links[0]["latest_scrape_run"]["status"], "success");
    }

    #[actix_rt::test]
    async fn failed_scrape_route_keeps_error_message() {
        let (_pool, services) = test_services(&test_config(None, None)).await;
        let app = test_app!(services);

        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "url": "https://shopee.com.br/item" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let run_id = created["scrape_run_id"].as_str().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/scrape-runs/{}/fail", run_id))
            .set_json(json!({ "error": "Shopee scraper not implemented yet" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let run: Value = test::read_body_json(resp).await;
        assert_eq!(run["status"], "error");
        assert_eq!(run["error"], "Shopee scraper not implemented yet");

        let req = test::TestRequest::post()
            .uri(&format!("/api/scrape-runs/{}/start", run_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_rt::test]
    async fn product_routes() {
        let (_pool, services) = test_services(&test_config(None, None)).await;
        let app = test_app!(services);

        let req = test::TestRequest::post()
            .uri("/api/links")
            .set_json(json!({ "url": ML_URL }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::post()
            .uri(&format!(
                "/api/scrape-runs/{}/complete",
                created["scrape_run_id"].as_str().unwrap()
            ))
            .set_json(complete_body("MLB-90", "Fone Bluetooth"))
            .to_request();
        let product: Value = test::call_and_read_body_json(&app, req).await;
        let product_id = product["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/products?search=bluetooth&marketplace=mercado_livre")
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["id"], product_id.as_str());

        let req = test::TestRequest::get()
            .uri("/api/products?search=cafeteira")
            .to_request();
        let none: Value = test::call_and_read_body_json(&app, req).await;
        assert!(none.as_array().unwrap().is_empty());

        let req = test::TestRequest::get()
            .uri("/api/products?marketplace=aliexpress")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/api/products/{}", product_id))
            .to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["title"], "Fone Bluetooth");
        assert_eq!(detail["versions"].as_array().unwrap().len(), 1);
        assert_eq!(detail["affiliate_links"].as_array().unwrap().len(), 1);
        assert!(detail["post_jobs"].as_array().unwrap().is_empty());

        let req = test::TestRequest::get()
            .uri("/api/products/no-existe")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
